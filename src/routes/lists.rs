//! List pages, one per entity, all rendered through the shared data table.

use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use actix_web_flash_messages::IncomingFlashMessages;
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use crate::domain::appointment::Appointment;
use crate::domain::catalog::ClinicService;
use crate::domain::inventory::InventoryItem;
use crate::domain::patient::Patient;
use crate::domain::payment::PaymentRecord;
use crate::domain::treatment::Treatment;
use crate::dto::pages::ListPageData;
use crate::models::auth::UserContext;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{base_context, list_state, render_template, scoped_request};
use crate::services::appointments::list_appointments;
use crate::services::catalog::list_services;
use crate::services::inventory::{inventory_categories, list_inventory};
use crate::services::entity::Entity;
use crate::services::patients::list_patients;
use crate::services::payments::list_payments;
use crate::services::treatments::list_treatments;
use crate::table::sort::SortDirection;
use crate::table::controller::ListController;
use crate::table::{Column, DataTable, FilterOption, StatusTab, TableLocalState};

/// Formats an amount in dong with dot-separated thousands.
pub fn format_vnd(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}{grouped} ₫")
}

fn or_dash(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

#[derive(Deserialize)]
struct SortParams {
    sort: Option<usize>,
    dir: Option<SortDirection>,
    #[serde(default)]
    filters: bool,
}

/// Table-local state requested by a header click or the filter toggle.
fn table_local(req: &HttpRequest) -> TableLocalState {
    let mut local = TableLocalState::default();
    let Ok(params) = serde_html_form::from_str::<SortParams>(req.query_string()) else {
        return local;
    };
    if let Some(column) = params.sort {
        local.toggle_sort(column);
        if params.dir == Some(SortDirection::Desc) {
            local.toggle_sort(column);
        }
    }
    if params.filters {
        local.toggle_filter();
    }
    local
}

struct ListPage<'a, T> {
    title: &'static str,
    path: &'static str,
    create_url: Option<&'static str>,
    table: DataTable<T>,
    list: ListController<T>,
    local: &'a TableLocalState,
}

/// Controller for `E` as seen by `user`, starting from the query string.
fn list_controller<E: Entity>(req: &HttpRequest, user: &UserContext) -> ListController<E> {
    let scope = if E::BRANCH_SCOPED {
        user.branch_scope()
    } else {
        None
    };
    ListController::new(E::NAME, scope, list_state(req))
}

fn render_list<T: Serialize>(
    tera: &Tera,
    mut context: Context,
    page: ListPage<'_, T>,
) -> HttpResponse {
    let table = page.list.view(&page.table, page.local);
    let data = ListPageData {
        title: page.title,
        path: page.path,
        table,
        state: page.list.into_state(),
        create_url: page.create_url,
    };
    context.insert("page", &data);
    render_template(tera, "list.html", &context)
}

pub fn patient_table() -> DataTable<Patient> {
    DataTable::new(vec![
        Column::new("code", "Code").sortable(),
        Column::new("name", "Name").sortable(),
        Column::new("phone", "Phone").render(|p: &Patient| or_dash(&p.phone)),
        Column::new("birth_date", "Date of birth").render(|p: &Patient| {
            p.birth_date
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "-".to_string())
        }),
        Column::new("branch", "Branch").render(|p: &Patient| or_dash(&p.branch)),
        Column::new("treatment_status", "Status"),
    ])
    .status_tabs(vec![
        StatusTab::new("All", "all"),
        StatusTab::new("New", "new"),
        StatusTab::new("In treatment", "in_progress"),
        StatusTab::new("Completed", "completed"),
    ])
}

pub fn payment_table() -> DataTable<PaymentRecord> {
    DataTable::new(vec![
        Column::new("invoice_code", "Invoice")
            .render(|p: &PaymentRecord| or_dash(&p.invoice_code))
            .sortable(),
        Column::new("patient_name", "Patient").sortable(),
        Column::new("amount_due", "Amount due")
            .render(|p: &PaymentRecord| format_vnd(p.amount_due))
            .sortable(),
        Column::new("amount_paid", "Paid").render(|p: &PaymentRecord| format_vnd(p.amount_paid())),
        Column::new("status", "Status"),
    ])
    .status_tabs(vec![
        StatusTab::new("All", "all"),
        StatusTab::new("Pending", "pending"),
        StatusTab::new("Partial", "partial"),
        StatusTab::new("Paid", "paid"),
    ])
    .row_link(|p: &PaymentRecord| format!("/payments/{}", p.id))
}

pub fn treatment_table() -> DataTable<Treatment> {
    DataTable::new(vec![
        Column::new("patient_name", "Patient").sortable(),
        Column::new("service_name", "Service").sortable(),
        Column::new("tooth", "Tooth").render(|t: &Treatment| or_dash(&t.tooth)),
        Column::new("dentist", "Dentist").render(|t: &Treatment| or_dash(&t.dentist)),
        Column::new("cost", "Cost")
            .render(|t: &Treatment| format_vnd(t.cost))
            .sortable(),
        Column::new("prescriptions", "Prescription")
            .render(|t: &Treatment| t.prescription_lines().len().to_string()),
        Column::new("status", "Status"),
    ])
    .status_tabs(vec![
        StatusTab::new("All", "all"),
        StatusTab::new("Planned", "planned"),
        StatusTab::new("In progress", "in_progress"),
        StatusTab::new("Completed", "completed"),
        StatusTab::new("Cancelled", "cancelled"),
    ])
}

pub fn appointment_table() -> DataTable<Appointment> {
    DataTable::new(vec![
        Column::new("scheduled_at", "Time")
            .render(|a: &Appointment| a.scheduled_at.format("%d/%m/%Y %H:%M").to_string())
            .sortable(),
        Column::new("patient_name", "Patient").sortable(),
        Column::new("patient_phone", "Phone").render(|a: &Appointment| or_dash(&a.patient_phone)),
        Column::new("dentist", "Dentist").render(|a: &Appointment| or_dash(&a.dentist)),
        Column::new("status", "Status"),
    ])
    .status_tabs(vec![
        StatusTab::new("All", "all"),
        StatusTab::new("Scheduled", "scheduled"),
        StatusTab::new("Confirmed", "confirmed"),
        StatusTab::new("Completed", "completed"),
        StatusTab::new("Cancelled", "cancelled"),
        StatusTab::new("No show", "no_show"),
    ])
}

pub fn inventory_table(categories: &[String]) -> DataTable<InventoryItem> {
    DataTable::new(vec![
        Column::new("code", "Code").sortable(),
        Column::new("name", "Name").sortable(),
        Column::new("category", "Category").render(|i: &InventoryItem| or_dash(&i.category)),
        Column::new("quantity", "Quantity").sortable(),
        Column::new("unit_price", "Unit price")
            .render(|i: &InventoryItem| format_vnd(i.unit_price))
            .sortable(),
        Column::new("stock", "Stock").render(|i: &InventoryItem| i.stock_status().to_string()),
    ])
    .status_tabs(vec![
        StatusTab::new("All", "all"),
        StatusTab::new("In stock", "in_stock"),
        StatusTab::new("Low stock", "low_stock"),
        StatusTab::new("Out of stock", "out_of_stock"),
    ])
    .filter_options(
        "Category",
        categories
            .iter()
            .map(|c| FilterOption::new(c.clone(), c.clone()))
            .collect(),
    )
}

pub fn service_table() -> DataTable<ClinicService> {
    DataTable::new(vec![
        Column::new("code", "Code").sortable(),
        Column::new("name", "Name").sortable(),
        Column::new("category", "Category").render(|s: &ClinicService| or_dash(&s.category)),
        Column::new("price", "Price")
            .render(|s: &ClinicService| format_vnd(s.price))
            .sortable(),
        Column::new("status", "Status"),
    ])
    .status_tabs(vec![
        StatusTab::new("All", "all"),
        StatusTab::new("Active", "active"),
        StatusTab::new("Inactive", "inactive"),
    ])
}

#[get("/patients")]
pub async fn show_patients(
    req: HttpRequest,
    user: UserContext,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let table = patient_table();
    let mut list = list_controller::<Patient>(&req, &user);
    list.load(&table, |state| {
        let request = scoped_request::<Patient>(&user, state, None);
        list_patients(repo.get_ref(), &server_config.collections, &request)
    });

    let context = base_context(&flash_messages, &user, "patients");
    let local = table_local(&req);
    render_list(
        &tera,
        context,
        ListPage {
            title: "Patients",
            path: "/patients",
            create_url: Some("/patients/new"),
            table,
            list,
            local: &local,
        },
    )
}

#[get("/payments")]
pub async fn show_payments(
    req: HttpRequest,
    user: UserContext,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let table = payment_table();
    let mut list = list_controller::<PaymentRecord>(&req, &user);
    list.load(&table, |state| {
        let request = scoped_request::<PaymentRecord>(&user, state, None);
        list_payments(repo.get_ref(), &server_config.collections, &request)
    });

    let context = base_context(&flash_messages, &user, "payments");
    let local = table_local(&req);
    render_list(
        &tera,
        context,
        ListPage {
            title: "Payments",
            path: "/payments",
            create_url: None,
            table,
            list,
            local: &local,
        },
    )
}

#[get("/treatments")]
pub async fn show_treatments(
    req: HttpRequest,
    user: UserContext,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let table = treatment_table();
    let mut list = list_controller::<Treatment>(&req, &user);
    list.load(&table, |state| {
        let request = scoped_request::<Treatment>(&user, state, None);
        list_treatments(repo.get_ref(), &server_config.collections, &request)
    });

    let context = base_context(&flash_messages, &user, "treatments");
    let local = table_local(&req);
    render_list(
        &tera,
        context,
        ListPage {
            title: "Treatments",
            path: "/treatments",
            create_url: None,
            table,
            list,
            local: &local,
        },
    )
}

#[get("/appointments")]
pub async fn show_appointments(
    req: HttpRequest,
    user: UserContext,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let table = appointment_table();
    let mut list = list_controller::<Appointment>(&req, &user);
    list.load(&table, |state| {
        let request = scoped_request::<Appointment>(&user, state, None);
        list_appointments(repo.get_ref(), &server_config.collections, &request)
    });

    let context = base_context(&flash_messages, &user, "appointments");
    let local = table_local(&req);
    render_list(
        &tera,
        context,
        ListPage {
            title: "Appointments",
            path: "/appointments",
            create_url: None,
            table,
            list,
            local: &local,
        },
    )
}

#[get("/inventory")]
pub async fn show_inventory(
    req: HttpRequest,
    user: UserContext,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let collections = &server_config.collections;
    let categories = inventory_categories(repo.get_ref(), collections);
    let table = inventory_table(&categories);
    let mut list = list_controller::<InventoryItem>(&req, &user);
    list.load(&table, |state| {
        let request = scoped_request::<InventoryItem>(&user, state, None);
        list_inventory(
            repo.get_ref(),
            collections,
            &request,
            state.filter.as_deref(),
        )
    });

    let context = base_context(&flash_messages, &user, "inventory");
    let local = table_local(&req);
    render_list(
        &tera,
        context,
        ListPage {
            title: "Inventory",
            path: "/inventory",
            create_url: None,
            table,
            list,
            local: &local,
        },
    )
}

#[get("/services")]
pub async fn show_services(
    req: HttpRequest,
    user: UserContext,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let table = service_table();
    let mut list = list_controller::<ClinicService>(&req, &user);
    list.load(&table, |state| {
        let request = scoped_request::<ClinicService>(&user, state, None);
        list_services(repo.get_ref(), &server_config.collections, &request)
    });

    let context = base_context(&flash_messages, &user, "services");
    let local = table_local(&req);
    render_list(
        &tera,
        context,
        ListPage {
            title: "Services",
            path: "/services",
            create_url: None,
            table,
            list,
            local: &local,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_are_grouped_by_thousands() {
        assert_eq!(format_vnd(0.0), "0 ₫");
        assert_eq!(format_vnd(950.0), "950 ₫");
        assert_eq!(format_vnd(1_200_000.0), "1.200.000 ₫");
        assert_eq!(format_vnd(-35_000.4), "-35.000 ₫");
    }

    #[test]
    fn sort_parameters_set_local_sort() {
        let req = actix_web::test::TestRequest::default()
            .uri("/payments?sort=2&dir=desc")
            .to_http_request();
        let local = table_local(&req);
        let sort = local.sort.unwrap();
        assert_eq!(sort.column, 2);
        assert_eq!(sort.direction, SortDirection::Desc);

        let req = actix_web::test::TestRequest::default()
            .uri("/payments")
            .to_http_request();
        assert_eq!(table_local(&req), TableLocalState::default());
    }

    #[test]
    fn filters_parameter_opens_the_filter_panel() {
        let req = actix_web::test::TestRequest::default()
            .uri("/inventory?filters=true&filter=Consumables")
            .to_http_request();
        let local = table_local(&req);
        assert!(local.filter_open);
        assert_eq!(local.sort, None);
    }
}
