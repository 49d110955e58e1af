mod health_dto;

pub use health_dto::{
    CheckDto, HealthChecksDto, HealthReportDto, InfoDto, LivenessDto, ReadinessDto,
};
