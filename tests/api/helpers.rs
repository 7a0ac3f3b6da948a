use chrono::NaiveDate;
use reqwest::Response;
use rota_overtime::{
    app_state::{
        AppState, IdentitySelectionStoreType, LeaveStoreType, ProfileStoreType,
    },
    domain::{
        FixedClock, LineUserId, MemberName, ProfileStore, Role, Team,
        UserProfile,
    },
    services::{
        data_stores::{
            HashmapIdentitySelectionStore, HashmapLeaveStore,
            HashmapProfileStore,
        },
        LineMessagingClient,
    },
    utils::{
        config::AppConfig,
        constants::{test, LINE_PUSH_PATH},
    },
    Application,
};
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use test_context::AsyncTestContext;
use tokio::sync::RwLock;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const LEAVE_DATE: &str = "2025-04-03";
pub const ADMIN: u8 = 0xff;

pub struct TestApp {
    pub address: String,
    pub http_client: reqwest::Client,
    pub line_server: MockServer,
    pub leave_store: LeaveStoreType,
    pub profile_store: ProfileStoreType,
    pub identity_selection_store: IdentitySelectionStoreType,
}

impl TestApp {
    pub async fn new() -> Self {
        let leave_store =
            Arc::new(RwLock::new(HashmapLeaveStore::default()));
        let profile_store =
            Arc::new(RwLock::new(HashmapProfileStore::default()));
        let identity_selection_store =
            Arc::new(RwLock::new(HashmapIdentitySelectionStore::default()));

        for profile in crew() {
            profile_store
                .write()
                .await
                .add_profile(profile)
                .await
                .expect("Failed to seed profile");
        }

        let line_server = MockServer::start().await;
        let config = configure_app(&line_server.uri());
        let line_client = LineMessagingClient::new(
            config.line_api_base_url.clone(),
            config.line_channel_access_token.clone(),
            config.notification_timeout,
        )
        .expect("Failed to build LINE client");

        let app_state = AppState::new(
            leave_store.clone(),
            profile_store.clone(),
            identity_selection_store.clone(),
            Arc::new(line_client),
            Arc::new(FixedClock(leave_date())),
            Arc::new(config),
        );

        let app = Application::build(app_state, test::APP_ADDRESS)
            .await
            .expect("Failed to build app");
        let address = format!("http://{}", app.address.clone());

        #[allow(clippy::let_underscore_future)]
        let _ = tokio::spawn(app.run());

        let http_client = reqwest::Client::new();

        Self {
            address,
            http_client,
            line_server,
            leave_store,
            profile_store,
            identity_selection_store,
        }
    }

    pub async fn post_leave<Body>(&self, body: &Body) -> Response
    where
        Body: serde::Serialize,
    {
        self.http_client
            .post(format!("{}/leave", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put_leave<Body>(&self, body: &Body) -> Response
    where
        Body: serde::Serialize,
    {
        self.http_client
            .put(format!("{}/leave", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete_leave(&self, query: &[(&str, &str)]) -> Response {
        self.http_client
            .delete(format!("{}/leave", &self.address))
            .query(query)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_leave(&self, query: &[(&str, &str)]) -> Response {
        self.http_client
            .get(format!("{}/leave", &self.address))
            .query(query)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_shifts(&self, query: &[(&str, &str)]) -> Response {
        self.http_client
            .get(format!("{}/shifts", &self.address))
            .query(query)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_eligibility<Body>(&self, body: &Body) -> Response
    where
        Body: serde::Serialize,
    {
        self.http_client
            .post(format!("{}/eligibility", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_opportunities(&self, query: &[(&str, &str)]) -> Response {
        self.http_client
            .get(format!("{}/opportunities", &self.address))
            .query(query)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_webhook<Body>(&self, body: &Body) -> Response
    where
        Body: serde::Serialize,
    {
        self.http_client
            .post(format!("{}/webhook", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Accepts every push and expects exactly `times` of them.
    pub async fn expect_pushes(&self, times: u64) {
        Mock::given(path(LINE_PUSH_PATH))
            .and(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(times)
            .mount(&self.line_server)
            .await;
    }

    /// Texts pushed so far, grouped by recipient.
    pub async fn pushed_messages(&self) -> HashMap<String, Vec<String>> {
        let mut messages: HashMap<String, Vec<String>> = HashMap::new();
        let requests = self
            .line_server
            .received_requests()
            .await
            .expect("Request recording is disabled");
        for request in requests {
            let body: Value =
                serde_json::from_slice(&request.body).expect("push body");
            let to = body["to"].as_str().unwrap_or_default().to_owned();
            let text = body["messages"][0]["text"]
                .as_str()
                .unwrap_or_default()
                .to_owned();
            messages.entry(to).or_default().push(text);
        }
        messages
    }
}

impl AsyncTestContext for TestApp {
    async fn setup() -> TestApp {
        TestApp::new().await
    }

    async fn teardown(self) {
        self.line_server.verify().await;
    }
}

fn configure_app(line_api_base_url: &str) -> AppConfig {
    let admin = line_id(ADMIN);
    let mut config = AppConfig::from_lookup(|name| match name {
        "LINE_CHANNEL_ACCESS_TOKEN" => Some(String::from("channel-token")),
        "DATABASE_URL" => Some(String::from("postgres://unused")),
        "LINE_API_BASE_URL" => Some(line_api_base_url.to_owned()),
        "ADMIN_LINE_USER_IDS" => Some(admin.to_string()),
        _ => None,
    })
    .expect("Failed to build test config");
    config.notification_timeout = test::line_client::TIMEOUT;
    config
}

pub fn leave_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 4, 3).expect("valid date")
}

pub fn line_id(n: u8) -> LineUserId {
    LineUserId::parse(&format!("U{:032x}", n)).expect("valid LINE id")
}

pub fn line_id_str(n: u8) -> String {
    line_id(n).to_string()
}

fn profile(n: u8, name: &str, team: Team, role: Role) -> UserProfile {
    UserProfile {
        line_user_id: line_id(n),
        display_name: name.to_owned(),
        team,
        role,
        member_name: MemberName::parse(name).expect("valid name"),
        notification_enabled: true,
    }
}

/// On 2025-04-03 team A works the early day shift, B the mid day shift,
/// C the night shift and D is on long rest.
pub fn crew() -> Vec<UserProfile> {
    vec![
        profile(1, "Liu Yan", Team::B, Role::Member),
        profile(2, "Chang Hao", Team::B, Role::Leader),
        profile(3, "Lin Mei", Team::A, Role::Member),
        profile(4, "Cheng Yu", Team::C, Role::Member),
        profile(5, "Lee Shan", Team::D, Role::Leader),
        profile(6, "Chou Ping", Team::D, Role::Member),
    ]
}

pub async fn get_json_response_body(response: Response) -> Value {
    response
        .json()
        .await
        .expect("failed to parse response body JSON")
}

/// Files a full-day leave for Liu Yan on [`LEAVE_DATE`].
pub async fn create_default_leave(app: &TestApp) -> Value {
    let response = app
        .post_leave(&serde_json::json!({
            "date": LEAVE_DATE,
            "name": "Liu Yan",
            "lineUserId": line_id_str(1)
        }))
        .await;
    assert_eq!(response.status().as_u16(), 201, "Failed to create leave");
    get_json_response_body(response).await
}
