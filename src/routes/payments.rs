use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use chrono::Utc;
use tera::Tera;

use crate::domain::payment::PaymentRecord;
use crate::domain::types::DocumentId;
use crate::dto::pages::PaymentDetail;
use crate::forms::guard::SubmitGuard;
use crate::forms::payment::RecordPaymentForm;
use crate::models::auth::UserContext;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{error_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::documents::get_record;
use crate::services::payments::record_payment;

/// Loads a payment visible to `user`.
fn visible_payment(
    repo: &DieselRepository,
    server_config: &ServerConfig,
    user: &UserContext,
    id: &DocumentId,
) -> Result<PaymentRecord, ServiceError> {
    let record = get_record::<PaymentRecord, _>(repo, &server_config.collections, id)?
        .ok_or(ServiceError::NotFound("payment"))?;
    match user.fixed_branch() {
        Some(branch) if record.branch.as_deref() != Some(branch) => {
            Err(ServiceError::NotFound("payment"))
        }
        _ => Ok(record),
    }
}

fn render_payment(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    user: &UserContext,
    record: PaymentRecord,
    form: &RecordPaymentForm,
    error: Option<&str>,
) -> HttpResponse {
    let mut context = error_context(flash_messages, user, "payments", error);
    context.insert("payment", &PaymentDetail::from(record));
    context.insert("form", form);
    render_template(tera, "payments/show.html", &context)
}

#[get("/payments/{payment_id}")]
pub async fn show_payment(
    payment_id: web::Path<String>,
    user: UserContext,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let Ok(id) = DocumentId::new(payment_id.into_inner()) else {
        FlashMessage::error("Payment not found.").send();
        return redirect("/payments");
    };

    match visible_payment(repo.get_ref(), &server_config, &user, &id) {
        Ok(record) => {
            let form = RecordPaymentForm {
                version: record.version,
                method: "cash".to_string(),
                ..RecordPaymentForm::default()
            };
            render_payment(&tera, &flash_messages, &user, record, &form, None)
        }
        Err(ServiceError::NotFound(_)) => {
            FlashMessage::error("Payment not found.").send();
            redirect("/payments")
        }
        Err(err) => {
            log::error!("Failed to load payment {id}: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/payments/{payment_id}/record")]
pub async fn record_payment_entry(
    payment_id: web::Path<String>,
    user: UserContext,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    guard: web::Data<SubmitGuard>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<RecordPaymentForm>,
) -> impl Responder {
    let Ok(id) = DocumentId::new(payment_id.into_inner()) else {
        FlashMessage::error("Payment not found.").send();
        return redirect("/payments");
    };
    let show_url = format!("/payments/{id}");

    let Some(_ticket) = guard.try_begin(format!("payment:{id}")) else {
        FlashMessage::warning("A payment for this invoice is already being recorded.").send();
        return redirect(&show_url);
    };

    let record = match visible_payment(repo.get_ref(), &server_config, &user, &id) {
        Ok(record) => record,
        Err(ServiceError::NotFound(_)) => {
            FlashMessage::error("Payment not found.").send();
            return redirect("/payments");
        }
        Err(err) => {
            log::error!("Failed to load payment {id}: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if record.version != form.version {
        return render_payment(
            &tera,
            &flash_messages,
            &user,
            record,
            &form,
            Some("This payment changed since you opened it. Review it and submit again."),
        );
    }

    let entry = match form.clone().into_entry(Utc::now().naive_utc()) {
        Ok(entry) => entry,
        Err(err) => {
            let message = format!("Please check the form: {err}");
            return render_payment(&tera, &flash_messages, &user, record, &form, Some(&message));
        }
    };

    match record_payment(repo.get_ref(), &server_config.collections, &id, &entry) {
        Ok(updated) => {
            FlashMessage::success(format!("Payment recorded, status is now {}.", updated.status))
                .send();
            redirect(&show_url)
        }
        Err(ServiceError::Conflict { .. }) => {
            FlashMessage::warning("This payment changed while saving. Review it and submit again.")
                .send();
            redirect(&show_url)
        }
        Err(err) => {
            log::error!("Failed to record payment {id}: {err}");
            render_payment(
                &tera,
                &flash_messages,
                &user,
                record,
                &form,
                Some("The payment could not be recorded. Please try again."),
            )
        }
    }
}
