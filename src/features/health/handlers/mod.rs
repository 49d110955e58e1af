pub mod health_handler;

pub use health_handler::{
    __path_health_report, __path_info, __path_liveness, __path_readiness, health_report, info,
    liveness, readiness,
};
