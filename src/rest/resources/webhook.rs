//! Webhook subscription resources.
//!
//! The signing secret is only returned when a webhook is created; it is kept
//! in the resource metadata rather than as a tracked attribute so it is never
//! sent back in updates.
//!
//! ```rust,ignore
//! use attio::rest::{Creatable, PathIds};
//! use attio::rest::resources::Webhook;
//! use attio::webhooks::WebhookHandler;
//! use serde_json::json;
//!
//! let webhook = Webhook::create(&client, &PathIds::new(), json!({
//!     "target_url": "https://example.com/attio",
//!     "subscriptions": [{"event_type": "record.created", "filter": null}],
//! })).await?;
//!
//! let handler = WebhookHandler::new(webhook.secret().expect("secret on create"));
//! ```

use serde_json::Value;

use crate::clients::HttpMethod;
use crate::config::WebhookSecret;
use crate::rest::{
    ApiResource, Creatable, Deletable, Listable, ResourceOperation, ResourcePath, Retrievable,
    Updatable,
};

const SECRET_KEY: &str = "secret";

resource_type!(
    /// A webhook subscription delivering workspace events to a URL.
    Webhook
);

impl ApiResource for Webhook {
    const NAME: &'static str = "Webhook";
    const ID_KEY: &'static str = "webhook_id";
    const PATHS: &'static [ResourcePath] = &[
        ResourcePath::new(HttpMethod::Post, ResourceOperation::Create, &[], "webhooks"),
        ResourcePath::new(
            HttpMethod::Get,
            ResourceOperation::Retrieve,
            &["webhook_id"],
            "webhooks/{webhook_id}",
        ),
        ResourcePath::new(HttpMethod::Get, ResourceOperation::List, &[], "webhooks"),
        ResourcePath::new(
            HttpMethod::Patch,
            ResourceOperation::Update,
            &["webhook_id"],
            "webhooks/{webhook_id}",
        ),
        ResourcePath::new(
            HttpMethod::Delete,
            ResourceOperation::Delete,
            &["webhook_id"],
            "webhooks/{webhook_id}",
        ),
    ];

    resource_accessors!();

    fn normalize(data: Value) -> Value {
        let Value::Object(mut map) = data else {
            return data;
        };
        if let Some(secret) = map.remove(SECRET_KEY) {
            let metadata = map
                .entry("_metadata")
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if let Value::Object(metadata) = metadata {
                metadata.insert(SECRET_KEY.to_string(), secret);
            }
        }
        Value::Object(map)
    }
}

impl Creatable for Webhook {}
impl Retrievable for Webhook {}
impl Listable for Webhook {}
impl Updatable for Webhook {}
impl Deletable for Webhook {}

impl Webhook {
    /// Returns the signing secret, present only on a freshly created webhook.
    #[must_use]
    pub fn secret(&self) -> Option<WebhookSecret> {
        self.metadata()
            .get(SECRET_KEY)
            .and_then(Value::as_str)
            .and_then(|secret| WebhookSecret::new(secret).ok())
    }

    /// Returns the delivery URL.
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        self.get_str("target_url")
    }
}
