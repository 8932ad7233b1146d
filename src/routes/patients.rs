use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::domain::patient::Patient;
use crate::domain::types::DocumentId;
use crate::forms::guard::SubmitGuard;
use crate::forms::patient::AddPatientForm;
use crate::models::auth::UserContext;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{error_context, redirect, render_template};
use crate::services::ServiceError;
use crate::services::documents::get_record;
use crate::services::patients::{create_patient, soft_delete_patient};

/// Patient codes are sequential, so registrations run one at a time.
const NEW_PATIENT_KEY: &str = "patient:new";

fn render_form(
    tera: &Tera,
    flash_messages: &IncomingFlashMessages,
    user: &UserContext,
    form: &AddPatientForm,
    error: Option<&str>,
) -> HttpResponse {
    let mut context = error_context(flash_messages, user, "patients", error);
    context.insert("form", form);
    context.insert("fixed_branch", &user.fixed_branch());
    render_template(tera, "patients/new.html", &context)
}

#[get("/patients/new")]
pub async fn new_patient(
    user: UserContext,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    render_form(
        &tera,
        &flash_messages,
        &user,
        &AddPatientForm::default(),
        None,
    )
}

#[post("/patients/add")]
pub async fn add_patient(
    user: UserContext,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    guard: web::Data<SubmitGuard>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Form(form): web::Form<AddPatientForm>,
) -> impl Responder {
    let Some(_ticket) = guard.try_begin(NEW_PATIENT_KEY) else {
        return render_form(
            &tera,
            &flash_messages,
            &user,
            &form,
            Some("Another registration is being saved. Please submit again."),
        );
    };

    let payload = match form.clone().into_new_patient(user.fixed_branch()) {
        Ok(patient) => patient,
        Err(err) => {
            log::warn!("Rejected patient form: {err}");
            let message = format!("Please check the form: {err}");
            return render_form(&tera, &flash_messages, &user, &form, Some(&message));
        }
    };

    match create_patient(repo.get_ref(), &server_config.collections, payload) {
        Ok(patient) => {
            FlashMessage::success(format!("Patient {} registered.", patient.code)).send();
            redirect("/patients")
        }
        Err(err) => {
            log::error!("Failed to register patient: {err}");
            render_form(
                &tera,
                &flash_messages,
                &user,
                &form,
                Some("The patient could not be saved. Please try again."),
            )
        }
    }
}

#[post("/patients/{patient_id}/delete")]
pub async fn delete_patient(
    patient_id: web::Path<String>,
    user: UserContext,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let Ok(id) = DocumentId::new(patient_id.into_inner()) else {
        FlashMessage::error("Patient not found.").send();
        return redirect("/patients");
    };

    let collections = &server_config.collections;
    if let Some(branch) = user.fixed_branch() {
        let in_branch = get_record::<Patient, _>(repo.get_ref(), collections, &id)
            .ok()
            .flatten()
            .is_some_and(|patient| patient.branch.as_deref() == Some(branch));
        if !in_branch {
            FlashMessage::error("Patient not found.").send();
            return redirect("/patients");
        }
    }

    match soft_delete_patient(repo.get_ref(), collections, &id) {
        Ok(patient) => {
            FlashMessage::success(format!("Patient {} removed.", patient.code)).send();
        }
        Err(ServiceError::NotFound(_)) => {
            FlashMessage::error("Patient not found.").send();
        }
        Err(err) => {
            log::error!("Failed to remove patient {id}: {err}");
            FlashMessage::error("The patient could not be removed.").send();
        }
    }
    redirect("/patients")
}
