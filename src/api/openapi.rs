//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    adventurers, auth, availability, consumables, equipment, finances, health, quests, upload, users,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Adventurer Guild API",
        version = "1.0.0",
        description = "Quest, roster, equipment and ledger management REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api", description = "Guild API")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::verify,
        // Users
        users::register,
        users::list_users,
        // Quests
        quests::list_quests,
        quests::get_quest,
        quests::create_quest,
        quests::update_quest,
        quests::update_status,
        quests::validate_quest,
        quests::invalidate_quest,
        quests::refuse_quest,
        quests::abandon_quest,
        quests::start_quest,
        quests::finish_quest,
        quests::attach_adventurers,
        quests::detach_adventurers,
        quests::set_adventurers,
        quests::attach_equipment_stocks,
        quests::detach_equipment_stocks,
        quests::set_equipment_stocks,
        quests::attach_consumables,
        quests::detach_consumables,
        quests::set_consumables,
        // Adventurers
        adventurers::list_adventurers,
        adventurers::get_adventurer,
        adventurers::create_adventurer,
        adventurers::update_adventurer,
        adventurers::delete_adventurer,
        // Availability
        availability::check_availability,
        availability::get_schedule,
        availability::available_adventurers,
        availability::list_rests,
        availability::create_rest,
        availability::update_rest,
        availability::delete_rest,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::list_equipment_stocks,
        equipment::create_stock,
        equipment::list_stocks,
        equipment::delete_stock,
        equipment::repair_stock,
        // Consumables
        consumables::list_consumables,
        consumables::get_consumable,
        consumables::create_consumable,
        consumables::update_consumable,
        consumables::delete_consumable,
        consumables::restock_consumable,
        // Finances
        finances::get_balance,
        finances::post_transaction,
        finances::get_statistics,
        finances::get_history,
        // Upload
        upload::upload_file,
    ),
    components(
        schemas(
            // Auth & users
            crate::models::user::Role,
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::CreateUser,
            crate::models::user::LoginRequest,
            crate::models::user::LoginResponse,
            crate::models::user::VerifyResponse,
            // Reference data
            crate::models::reference::NamedRecord,
            crate::models::reference::NameInput,
            // Quests
            crate::models::quest::QuestStatus,
            crate::models::quest::Quest,
            crate::models::quest::QuestConsumable,
            crate::models::quest::QuestDetails,
            crate::models::quest::CreateQuest,
            crate::models::quest::UpdateQuest,
            crate::models::quest::UpdateQuestStatus,
            crate::models::quest::IdsInput,
            crate::models::quest::ConsumableLine,
            crate::models::quest::ConsumablesInput,
            crate::models::quest::FinishQuest,
            crate::models::quest::QuestSort,
            // Adventurers
            crate::models::adventurer::Adventurer,
            crate::models::adventurer::AdventurerDetails,
            crate::models::adventurer::CreateAdventurer,
            crate::models::adventurer::UpdateAdventurer,
            crate::models::adventurer::SortOrder,
            // Availability
            crate::models::rest::RestType,
            crate::models::rest::AdventurerRest,
            crate::models::rest::CreateRest,
            crate::models::rest::UpdateRest,
            crate::models::rest::ScheduleEvent,
            crate::models::rest::Availability,
            crate::models::rest::DayStatus,
            crate::models::rest::DaySchedule,
            // Equipment
            crate::models::equipment::StockStatus,
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::EquipmentStock,
            // Consumables
            crate::models::consumable::Consumable,
            crate::models::consumable::CreateConsumable,
            crate::models::consumable::UpdateConsumable,
            crate::models::consumable::Restock,
            // Finances
            crate::models::finance::Transaction,
            crate::models::finance::CreateTransaction,
            crate::models::finance::BalanceResponse,
            crate::models::finance::FinanceStatistics,
            crate::models::finance::HistoryResponse,
            // Upload
            crate::services::storage::UploadResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User accounts"),
        (name = "quests", description = "Quest lifecycle and assignments"),
        (name = "adventurers", description = "Adventurer roster"),
        (name = "availability", description = "Schedules and rest periods"),
        (name = "equipment", description = "Equipment definitions and stock"),
        (name = "consumables", description = "Consumable stock"),
        (name = "finances", description = "Guild ledger"),
        (name = "upload", description = "Image upload")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_guild_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/quests/{id}/start"));
        assert!(doc.paths.paths.contains_key("/adventurer-availability/{adventurer_id}/schedule"));
        assert!(doc.paths.paths.contains_key("/finances/history"));

        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
