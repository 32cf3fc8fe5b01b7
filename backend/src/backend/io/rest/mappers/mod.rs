//! DTO <-> domain conversions for the REST layer. Mappers own all string
//! date and time parsing so the domain only ever sees typed values.

pub mod catalog_mapper;
pub mod customer_mapper;
pub mod draft_mapper;
pub mod subscription_mapper;
