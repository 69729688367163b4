//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{clients, health, interventions, loaners, loans, parts};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier API",
        version = "1.0.0",
        description = "Appliance Repair Shop Management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Atelier Team", email = "contact@atelier-sav.fr")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Clients & devices
        clients::list_clients,
        clients::get_client,
        clients::create_client,
        clients::update_client,
        clients::delete_client,
        clients::list_devices,
        clients::create_device,
        clients::update_device,
        clients::delete_device,
        // Interventions
        interventions::list_interventions,
        interventions::get_intervention,
        interventions::create_intervention,
        interventions::update_intervention,
        interventions::delete_intervention,
        interventions::record_part_usage,
        interventions::commit_deposit,
        // Loaner devices
        loaners::list_loaners,
        loaners::list_available_loaners,
        loaners::get_loaner,
        loaners::create_loaner,
        loaners::update_loaner,
        loaners::delete_loaner,
        loaners::list_loaner_loans,
        // Loans
        loans::list_loans,
        loans::create_loan,
        loans::return_loan,
        // Parts
        parts::list_parts,
        parts::list_alerts,
        parts::get_part,
        parts::create_part,
        parts::update_part,
        parts::delete_part,
    ),
    components(
        schemas(
            // Clients & devices
            crate::models::client::Client,
            crate::models::client::Device,
            crate::models::client::CreateClient,
            crate::models::client::UpdateClient,
            crate::models::client::CreateDevice,
            crate::models::client::UpdateDevice,
            // Interventions
            crate::models::intervention::Intervention,
            crate::models::intervention::DeviceRef,
            crate::models::intervention::PartUsage,
            crate::models::intervention::WorkshopDeposit,
            crate::models::intervention::CreateIntervention,
            crate::models::intervention::UpdateIntervention,
            crate::models::intervention::RecordPartUsage,
            crate::models::intervention::CommitDeposit,
            crate::models::enums::InterventionStatus,
            crate::models::enums::InterventionType,
            // Loaner devices
            crate::models::loaner::LoanerDevice,
            crate::models::loaner::CreateLoanerDevice,
            crate::models::loaner::UpdateLoanerDevice,
            crate::models::enums::LoanerDeviceStatus,
            // Loans
            crate::models::loan::Loan,
            crate::models::loan::LoanDetails,
            crate::models::loan::CreateLoan,
            crate::models::loan::ReturnLoan,
            crate::models::enums::LoanStatus,
            loans::LoanResponse,
            // Parts
            crate::models::part::Part,
            crate::models::part::CreatePart,
            crate::models::part::UpdatePart,
            crate::models::part::StockAlerts,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "clients", description = "Client and client-device management"),
        (name = "interventions", description = "Repair intervention workflow"),
        (name = "loaners", description = "Loaner device fleet"),
        (name = "loans", description = "Loaner device loans"),
        (name = "parts", description = "Spare-parts stock")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
