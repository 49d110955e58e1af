pub mod facility_handler;

pub use facility_handler::{
    __path_create_facility, __path_delete_facility, __path_get_facility, __path_list_facilities,
    __path_nearest_facilities, __path_update_facility, create_facility, delete_facility,
    get_facility, list_facilities, nearest_facilities, update_facility,
};
