use crate::backend::domain::commands::customers::CustomerSearchResult;
use crate::backend::domain::models::Customer;
use shared::{CustomerDto, CustomerSearchResponse};

pub struct CustomerMapper;

impl CustomerMapper {
    /// Convert a domain customer to its wire form
    pub fn to_dto(customer: &Customer) -> CustomerDto {
        CustomerDto {
            id: customer.id.clone(),
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
            address: customer.address.clone(),
        }
    }

    /// Convert a list of domain customers to wire form
    pub fn to_dto_list(customers: &[Customer]) -> Vec<CustomerDto> {
        customers.iter().map(Self::to_dto).collect()
    }

    pub fn to_search_response(result: CustomerSearchResult) -> CustomerSearchResponse {
        CustomerSearchResponse {
            customers: Self::to_dto_list(&result.customers),
            superseded: result.superseded,
        }
    }
}
