mod show;
mod status;
mod try_it;

pub use show::run_show;
pub use status::run_status;
pub use try_it::run_try;
