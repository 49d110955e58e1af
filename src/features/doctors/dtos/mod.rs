mod doctor_dto;

pub use doctor_dto::{
    AvailabilityDto, CreateDoctorDto, DoctorAddressDto, DoctorContactDto, DoctorDetailDto,
    DoctorListItemDto, DoctorResponseDto, ListDoctorsQuery, NearestDoctorsDto, OpeningHoursDto,
    UpdateDoctorDto,
};
