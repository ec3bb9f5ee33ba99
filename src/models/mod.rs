pub mod appraisal;
pub mod checkout;
pub mod prompt;
pub mod sheet_row;
