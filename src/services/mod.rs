pub mod appraisal;
pub mod sheet_log;
