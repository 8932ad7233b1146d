use actix_web::{HttpResponse, Responder, get, web};
use serde::Serialize;

use crate::domain::appointment::Appointment;
use crate::domain::catalog::ClinicService;
use crate::domain::inventory::InventoryItem;
use crate::domain::patient::Patient;
use crate::domain::payment::PaymentRecord;
use crate::domain::treatment::Treatment;
use crate::dto::api::ApiListQuery;
use crate::models::auth::UserContext;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::restrict_to_branch;
use crate::services::entity::Entity;
use crate::services::inventory::list_inventory;
use crate::services::listing::{ListRequest, ListResult, list_documents};

fn request_for<E: Entity>(user: &UserContext, query: &ApiListQuery) -> ListRequest {
    let mut request = ListRequest::from(query);
    restrict_to_branch::<E>(user, &mut request);
    request
}

fn list<E: Entity>(
    repo: &DieselRepository,
    server_config: &ServerConfig,
    user: &UserContext,
    query: &ApiListQuery,
) -> HttpResponse {
    let result: ListResult<E> =
        list_documents(repo, &server_config.collections, &request_for::<E>(user, query));
    json(&result)
}

fn json<T: Serialize>(result: &ListResult<T>) -> HttpResponse {
    HttpResponse::Ok().json(result)
}

/// `{ data, total }` for one entity; failures yield an empty list.
#[get("/v1/{entity}")]
pub async fn api_v1_list(
    entity: web::Path<String>,
    query: web::Query<ApiListQuery>,
    user: UserContext,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let repo = repo.get_ref();
    match entity.as_str() {
        "patients" => list::<Patient>(repo, &server_config, &user, &query),
        "payments" => list::<PaymentRecord>(repo, &server_config, &user, &query),
        "treatments" => list::<Treatment>(repo, &server_config, &user, &query),
        "appointments" => list::<Appointment>(repo, &server_config, &user, &query),
        "services" => list::<ClinicService>(repo, &server_config, &user, &query),
        "inventory" => {
            let request = request_for::<InventoryItem>(&user, &query);
            json(&list_inventory(
                repo,
                &server_config.collections,
                &request,
                query.category.as_deref(),
            ))
        }
        _ => HttpResponse::NotFound().finish(),
    }
}
