mod nearest_dto;

pub use nearest_dto::{LocationInputDto, NearestRequest, NearestResponseDto};
