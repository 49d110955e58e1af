pub mod doctor_handler;

pub use doctor_handler::{
    __path_create_doctor, __path_delete_doctor, __path_get_doctor, __path_list_doctors,
    __path_nearest_doctors, __path_update_doctor, create_doctor, delete_doctor, get_doctor,
    list_doctors, nearest_doctors, update_doctor,
};
