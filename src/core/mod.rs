pub mod del;
pub mod directory;
pub mod dispatcher;
pub mod executor;
pub mod ledger;
pub mod log;
pub mod report;
pub mod status;
pub mod transition;
