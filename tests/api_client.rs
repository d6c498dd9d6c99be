mod common;

use common::{client, event_json, EVENT_ID};
use serde_json::json;
use std::time::Duration;
use ticketera::config::CredentialsMode;
use ticketera::error::ApiError;
use chrono::{TimeZone, Utc};
use ticketera::models::access::{AssignAccessRequest, TransferAccessRequest};
use ticketera::models::list::{CreateListRequest, GuestInput};
use ticketera::models::{CatalogItemType, CreateEventRequest};
use ticketera::services::ApiClient;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn event_decodes_and_marks_sold_sectors_visible() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/ev1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_json()))
        .mount(&server)
        .await;

    let event = client(&server, CredentialsMode::Omit).get_event(EVENT_ID).await.unwrap();
    let stadium = event.stadium.as_ref().unwrap();

    assert_eq!(event.catalog_items.len(), 3);
    assert!(stadium.find_sector("sec-num").unwrap().1.visible);
    assert!(stadium.find_sector("sec-gen").unwrap().1.visible);
    assert!(!stadium.find_sector("sec-palcos").unwrap().1.visible);
}

#[tokio::test]
async fn reserve_posts_seat_codes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/events/ev1/catalog/platea/seats/reserve"))
        .and(body_json(json!({ "seats": ["A1", "A2"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;

    let seats = vec!["A1".to_string(), "A2".to_string()];
    let resp = client(&server, CredentialsMode::Omit)
        .reserve_seats(EVENT_ID, "platea", &seats)
        .await
        .unwrap();
    assert!(resp.is_success());
}

#[tokio::test]
async fn reserve_race_is_reported_in_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/events/ev1/catalog/platea/seats/reserve"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "error", "message": "Seat A1 already reserved" })),
        )
        .mount(&server)
        .await;

    let resp = client(&server, CredentialsMode::Omit)
        .reserve_seats(EVENT_ID, "platea", &["A1".to_string()])
        .await
        .unwrap();
    assert!(!resp.is_success());
    assert_eq!(resp.message.as_deref(), Some("Seat A1 already reserved"));
}

#[tokio::test]
async fn status_codes_map_to_business_errors() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/lists/l1"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({ "message": "numbered" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/lists"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({ "message": "La lista ya existe" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "boom" })))
        .mount(&server)
        .await;

    let api = client(&server, CredentialsMode::Omit);

    let err = api.delete_guest_list("l1").await.unwrap_err();
    assert!(matches!(err, ApiError::NumberedSectorList));
    assert_eq!(err.user_message(), "La lista está asociada a un sector numerado");

    let req = CreateListRequest {
        name: "Invitados".into(),
        event_id: EVENT_ID.into(),
        capacity: 50,
        sector_id: None,
    };
    let err = api.create_guest_list(&req).await.unwrap_err();
    assert!(matches!(&err, ApiError::Conflict(msg) if msg == "La lista ya existe"));
    assert_eq!(err.status_code(), 409);

    assert!(matches!(api.current_user().await.unwrap_err(), ApiError::Unauthorized));

    let err = api.list_events().await.unwrap_err();
    assert!(matches!(&err, ApiError::Http { status: 500, message } if message == "boom"));
}

#[tokio::test]
async fn unexpected_shape_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/ev1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7 })))
        .mount(&server)
        .await;

    let err = client(&server, CredentialsMode::Omit).get_event(EVENT_ID).await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn cookie_is_forwarded_only_in_include_mode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lists"))
        .and(query_param("eventId", EVENT_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let cookie = Some("sid=abc123".to_string());
    client(&server, CredentialsMode::Include)
        .with_session(cookie.clone())
        .list_guest_lists(EVENT_ID)
        .await
        .unwrap();
    client(&server, CredentialsMode::Omit)
        .with_session(cookie)
        .list_guest_lists(EVENT_ID)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0].headers.get("cookie").and_then(|v| v.to_str().ok()),
        Some("sid=abc123")
    );
    assert!(requests[1].headers.get("cookie").is_none());
}

#[tokio::test]
async fn include_mode_matches_cookie_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("cookie", "sid=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "email": "socio@river.com",
            "firstName": "Enzo",
            "lastName": "Pérez",
            "role": "club"
        })))
        .mount(&server)
        .await;

    let user = client(&server, CredentialsMode::Include)
        .with_session(Some("sid=abc123".into()))
        .current_user()
        .await
        .unwrap();
    assert_eq!(user.display_name(), "Enzo Pérez");
    assert!(user.can_manage_events());
}

#[tokio::test]
async fn invalid_input_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let guest = GuestInput {
        name: "A".into(),
        email: Some("no-es-un-mail".into()),
        dni: None,
    };
    let err = client(&server, CredentialsMode::Omit).add_guest("l1", &guest).await.unwrap_err();

    let ApiError::Validation(errors) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    let fields = ticketera::error::field_messages(errors);
    assert_eq!(fields["name"], vec!["Nombre inválido"]);
    assert_eq!(fields["email"], vec!["Email inválido"]);
}

#[tokio::test]
async fn cancelled_token_aborts_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events/ev1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(event_json())
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let api = client(&server, CredentialsMode::Omit);
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let result = ApiClient::cancellable(&token, api.get_event(EVENT_ID)).await;
    assert!(matches!(result, Err(ApiError::Cancelled)));
}

fn create_event_request(service_charge: f64) -> CreateEventRequest {
    CreateEventRequest {
        name: "River vs Boca".into(),
        date: Utc.with_ymd_and_hms(2026, 11, 20, 21, 0, 0).unwrap(),
        description: None,
        address: Some("Av. Pres. Figueroa Alcorta 7597, CABA".into()),
        service_charge,
        stadium_id: Some("monumental".into()),
    }
}

#[tokio::test]
async fn create_event_posts_form_and_decodes_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/events"))
        .and(body_partial_json(json!({
            "name": "River vs Boca",
            "serviceCharge": 10.0,
            "stadiumId": "monumental"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(event_json()))
        .expect(1)
        .mount(&server)
        .await;

    let event = client(&server, CredentialsMode::Omit)
        .create_event(&create_event_request(10.0))
        .await
        .unwrap();
    assert_eq!(event.id, EVENT_ID);
    assert_eq!(event.club_id.as_deref(), Some("river"));
    assert_eq!(event.catalog_items.len(), 3);
}

#[tokio::test]
async fn invalid_event_form_is_not_sent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(201).set_body_json(event_json()))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server, CredentialsMode::Omit)
        .create_event(&create_event_request(140.0))
        .await
        .unwrap_err();
    let ApiError::Validation(errors) = &err else {
        panic!("expected validation error, got {err:?}");
    };
    let fields = ticketera::error::field_messages(errors);
    assert_eq!(fields["service_charge"], vec!["El cargo debe estar entre 0 y 100"]);
}

#[tokio::test]
async fn accesses_assign_transfer_and_lookup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/accesses/assign"))
        .and(body_json(json!({ "catalogItemId": "popular", "email": "hincha@mail.com", "quantity": 2 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "acc-1", "catalogItemId": "popular", "ownerEmail": "hincha@mail.com" },
            { "id": "acc-2", "catalogItemId": "popular", "ownerEmail": "hincha@mail.com" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/accesses/transfer"))
        .and(body_json(json!({ "accessId": "acc-1", "email": "amigo@mail.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "acc-1",
            "catalogItemId": "platea",
            "ownerEmail": "amigo@mail.com",
            "seatCode": "A1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/accesses/acc-1/catalog-item"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_json()["catalogItems"][0].clone()))
        .mount(&server)
        .await;

    let api = client(&server, CredentialsMode::Omit);

    let assign = AssignAccessRequest {
        catalog_item_id: "popular".into(),
        email: "hincha@mail.com".into(),
        quantity: 2,
    };
    let accesses = api.assign_access(&assign).await.unwrap();
    assert_eq!(accesses.len(), 2);
    assert!(accesses.iter().all(|a| a.seat_code.is_none()));

    let transfer = TransferAccessRequest {
        access_id: "acc-1".into(),
        email: "amigo@mail.com".into(),
    };
    let access = api.transfer_access(&transfer).await.unwrap();
    assert_eq!(access.owner_email, "amigo@mail.com");
    assert_eq!(access.seat_code.as_deref(), Some("A1"));

    let item = api.access_catalog_item("acc-1").await.unwrap();
    assert_eq!(item.id, "platea");
    assert_eq!(item.kind, CatalogItemType::Sector);
    assert_eq!(item.max_per_person, Some(2));
}

#[tokio::test]
async fn access_transfer_needs_valid_email() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let transfer = TransferAccessRequest {
        access_id: "acc-1".into(),
        email: "amigo".into(),
    };
    let err = client(&server, CredentialsMode::Omit)
        .transfer_access(&transfer)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert_eq!(err.status_code(), 400);
}
