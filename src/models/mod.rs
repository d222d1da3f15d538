pub mod action;
pub mod action_record;
pub mod break_period;
pub mod outcome;
pub mod profile;
pub mod status;
pub mod work_session;
