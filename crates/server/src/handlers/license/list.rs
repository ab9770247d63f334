use std::{collections::HashMap, sync::Arc};

use axum::extract::{Path, State};
use axum_derive_error::ErrorResponse;
use db::{
    content, license, sea_query::Expr, usage_event, ColumnTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use derive_more::{Display, Error, From};
use serde::Serialize;

use crate::response::ApiResponse;

/// License with details of its content.
#[derive(Serialize)]
pub(super) struct LicenseData {
    #[serde(flatten)]
    license: license::Model,
    title: Option<String>,
    content_type: Option<String>,
    price_per_use: Option<String>,

    /// Number of recorded usages of this license.
    usage_count: i64,
}

#[derive(ErrorResponse, Display, From, Error)]
pub(super) enum LicenseListError {
    DatabaseError(DbErr),
}

/// List licenses owned by the provided wallet, newest first.
///
/// Each license is returned with the title, type and price of its content
/// and the number of recorded usages. Unknown wallets get an empty list.
pub(super) async fn list(
    Path(address): Path<String>,
    State(db): State<Arc<DatabaseConnection>>,
) -> Result<ApiResponse<Vec<LicenseData>>, LicenseListError> {
    let licenses = license::Entity::find()
        .find_also_related(content::Entity)
        .filter(license::Column::LicenseeAddress.eq(address))
        .order_by_desc(license::Column::CreatedAt)
        .order_by_desc(license::Column::Id)
        .all(&*db)
        .await?;

    let license_ids = licenses
        .iter()
        .map(|(license, _)| license.license_id.clone())
        .collect::<Vec<_>>();

    let usage_counts: HashMap<String, i64> = usage_event::Entity::find()
        .select_only()
        .column(usage_event::Column::LicenseId)
        .column_as(Expr::col(usage_event::Column::Id).count(), "uses")
        .filter(usage_event::Column::LicenseId.is_in(license_ids))
        .group_by(usage_event::Column::LicenseId)
        .into_tuple::<(String, i64)>()
        .all(&*db)
        .await?
        .into_iter()
        .collect();

    let items = licenses
        .into_iter()
        .map(|(license, content)| LicenseData {
            usage_count: usage_counts.get(&license.license_id).copied().unwrap_or(0),
            title: content.as_ref().map(|content| content.title.clone()),
            content_type: content.as_ref().map(|content| content.content_type.clone()),
            price_per_use: content.map(|content| content.price_per_use),
            license,
        })
        .collect::<Vec<_>>();

    let count = items.len();

    Ok(ApiResponse::new(items).with_count(count))
}

#[cfg(test)]
mod tests {
    use crate::testing::{
        create_content, create_database, create_license, test_router, ResponseBodyExt, ACCESSOR,
    };

    use assert_json::assert_json;
    use axum::{body::Body, http::Request};
    use db::{usage_event, ActiveValue, DatabaseConnection, EntityTrait};
    use tower::ServiceExt;

    async fn create_test_env(db: &DatabaseConnection) {
        create_content(db, "0x01", "hash1", "Greeting", "0.5", 100).await;
        create_license(db, "0xlicense", "0x01", ACCESSOR, true).await;
        create_license(db, "0xother", "0x01", "0xsomeoneelse", true).await;

        for event_id in ["0xevent1", "0xevent2"] {
            usage_event::Entity::insert(usage_event::ActiveModel {
                event_id: ActiveValue::Set(String::from(event_id)),
                content_id: ActiveValue::Set(String::from("0x01")),
                license_id: ActiveValue::Set(String::from("0xlicense")),
                timestamp: ActiveValue::Set(1672531200),
                created_at: ActiveValue::Set(1672531200),
                ..Default::default()
            })
            .exec_without_returning(db)
            .await
            .expect("unable to create usage event");
        }
    }

    #[tokio::test]
    async fn successful() {
        let db = create_database().await;

        create_test_env(&db).await;

        let response = test_router(db)
            .oneshot(
                Request::builder()
                    .uri(format!("/licenses/{ACCESSOR}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_json!(response.json().await, {
            "success": true,
            "count": 1,
            "data": [
                {
                    "license_id": "0xlicense",
                    "content_id": "0x01",
                    "licensee_address": "0xaccessor",
                    "active": true,
                    "title": "Greeting",
                    "content_type": "text",
                    "price_per_use": "0.5",
                    "usage_count": 2
                }
            ]
        });
    }

    #[tokio::test]
    async fn no_licenses() {
        let db = create_database().await;

        let response = test_router(db)
            .oneshot(
                Request::builder()
                    .uri("/licenses/0xnobody")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_json!(response.json().await, {
            "success": true,
            "count": 0
        });
    }
}
