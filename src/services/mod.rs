pub mod dispatcher;
pub mod email;
pub mod ledger;
pub mod notifier;
pub mod trade_poller;
