pub mod adjust_stock_command;
pub mod issue_stock_command;
pub mod restock_command;
pub mod return_issuance_command;

pub use adjust_stock_command::AdjustStockCommand;
pub use issue_stock_command::IssueStockCommand;
pub use restock_command::RestockCommand;
pub use return_issuance_command::ReturnIssuanceCommand;
