#![allow(dead_code)]

use serde_json::{json, Value};
use ticketera::config::{ApiConfig, CredentialsMode};
use ticketera::services::ApiClient;
use wiremock::MockServer;

pub const EVENT_ID: &str = "ev1";

/// Событие со стадионом: нумерованный сектор на севере, общий на юге и
/// сектор без позиции в каталоге на востоке.
pub fn event_json() -> Value {
    json!({
        "id": EVENT_ID,
        "name": "River vs Boca",
        "date": "2026-11-20T21:00:00Z",
        "address": "Av. Pres. Figueroa Alcorta 7597, CABA",
        "clubId": "river",
        "serviceCharge": 10,
        "catalogItems": [
            {
                "id": "platea",
                "name": "Platea San Martín",
                "type": "sector",
                "price": 1000,
                "stock": { "aviable": 3, "reserved": 0, "sold": 1 },
                "sectorId": "sec-num",
                "maxPerPerson": 2
            },
            {
                "id": "popular",
                "name": "Popular Sivori",
                "type": "sector",
                "price": 500,
                "stock": { "aviable": 100, "reserved": 5, "sold": 20 },
                "sectorId": "sec-gen"
            },
            {
                "id": "cortesia",
                "name": "Cortesía",
                "type": "ticket",
                "price": 0,
                "stock": { "aviable": 10, "reserved": 0, "sold": 0 }
            }
        ],
        "stadium": {
            "id": "monumental",
            "name": "Estadio Monumental",
            "stands": [
                {
                    "id": "N-1",
                    "orientation": "N",
                    "type": "1_bandeja",
                    "sectors": [{
                        "id": "sec-num",
                        "name": "Platea",
                        "numerated": true,
                        "seats": [
                            { "rowLabel": "A", "seatNumber": 1, "status": "available" },
                            { "rowLabel": "A", "seatNumber": 2, "status": "available" },
                            { "rowLabel": "A", "seatNumber": 3, "status": "available" },
                            { "rowLabel": "A", "seatNumber": 4, "status": "sold" }
                        ]
                    }]
                },
                {
                    "id": "S-1",
                    "orientation": "S",
                    "type": "1_bandeja",
                    "sectors": [{ "id": "sec-gen", "name": "Popular", "numerated": false }]
                },
                {
                    "id": "E-1",
                    "orientation": "E",
                    "type": "1_bandeja",
                    "sectors": [{ "id": "sec-palcos", "name": "Palcos" }]
                }
            ]
        }
    })
}

pub fn api_config(server: &MockServer, credentials: CredentialsMode) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        credentials,
        timeout_seconds: 5,
    }
}

pub fn client(server: &MockServer, credentials: CredentialsMode) -> ApiClient {
    ApiClient::from_config(&api_config(server, credentials)).unwrap()
}
