//! Automations REST client: time and event triggered executions run on behalf of an account

use crate::{ClientError, API_KEY_HEADER};
use ethers::types::{Address, Bytes, H256, U256};
use modulor_primitives::constants::automations::{ACCOUNT_TYPE, URL};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutomationType {
    TimeBased,
    EventBased,
}

/// Runs on a cron schedule
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTrigger {
    pub cron_expression: String,
    /// Unix timestamp in milliseconds
    pub start_date: u64,
}

/// Runs when a matching event reaches the account
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTrigger {
    /// Event filter, empty for every incoming transfer
    pub query: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TriggerData {
    Time(TimeTrigger),
    Event(EventTrigger),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub trigger_data: TriggerData,
}

/// Parameters of a dynamic action the calldata builder does not compute
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionParams {
    #[serde(rename = "static")]
    pub static_params: serde_json::Map<String, serde_json::Value>,
}

/// Native value of an action, sent as a JSON number
mod wei {
    use ethers::types::U256;
    use serde::{ser::Error, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wei {
        Number(u64),
        Quantity(U256),
    }

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        if value.bits() > 64 {
            return Err(S::Error::custom(format!("action value {value} does not fit a JSON number")));
        }
        serializer.serialize_u64(value.as_u64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        Ok(match Wei::deserialize(deserializer)? {
            Wei::Number(value) => value.into(),
            Wei::Quantity(value) => value,
        })
    }
}

/// What an automation executes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
    /// Fixed call
    #[serde(rename_all = "camelCase")]
    Static {
        target: Address,
        #[serde(with = "wei")]
        value: U256,
        call_data: Bytes,
    },
    /// Call data computed by a builder service when the automation runs
    #[serde(rename_all = "camelCase")]
    Dynamic {
        target: Address,
        #[serde(with = "wei")]
        value: U256,
        call_data_builder_url: String,
        function_selector: Bytes,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<ActionParams>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationData {
    pub trigger: Trigger,
    pub actions: Vec<Action>,
    pub max_number_of_executions: u64,
    /// Smart session authorising the actions, when they run through one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permission_id: Option<H256>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomationRequest {
    #[serde(rename = "type")]
    pub automation_type: AutomationType,
    pub data: AutomationData,
}

impl AutomationRequest {
    pub fn time_based(
        cron_expression: &str,
        start_date: u64,
        actions: Vec<Action>,
        max_number_of_executions: u64,
    ) -> Self {
        let trigger_data = TriggerData::Time(TimeTrigger {
            cron_expression: cron_expression.into(),
            start_date,
        });
        Self {
            automation_type: AutomationType::TimeBased,
            data: AutomationData {
                trigger: Trigger { trigger_data },
                actions,
                max_number_of_executions,
                permission_id: None,
            },
        }
    }

    pub fn event_based(query: &str, actions: Vec<Action>, max_number_of_executions: u64) -> Self {
        let trigger_data = TriggerData::Event(EventTrigger { query: query.into() });
        Self {
            automation_type: AutomationType::EventBased,
            data: AutomationData {
                trigger: Trigger { trigger_data },
                actions,
                max_number_of_executions,
                permission_id: None,
            },
        }
    }

    pub fn with_permission_id(mut self, permission_id: H256) -> Self {
        self.data.permission_id = Some(permission_id);
        self
    }
}

/// Account the automations run for
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationAccount {
    pub account: Address,
    pub account_type: String,
    pub account_init_code: Bytes,
    pub network: u64,
    /// Validator the automation signatures are checked against
    pub validator: Address,
}

impl AutomationAccount {
    /// Deployed Safe account
    pub fn safe(account: Address, network: u64, validator: Address) -> Self {
        Self {
            account,
            account_type: ACCOUNT_TYPE.into(),
            account_init_code: Bytes::default(),
            network,
            validator,
        }
    }
}

#[derive(Serialize)]
struct CreateAutomationBody<'a> {
    #[serde(flatten)]
    account: &'a AutomationAccount,
    #[serde(flatten)]
    request: &'a AutomationRequest,
}

/// Created automation, active once signed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Automation {
    pub id: String,
    /// Digest the account signs to activate the automation
    pub hash: H256,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Serialize)]
struct SignAutomationBody<'a> {
    signature: &'a Bytes,
}

/// One execution attempt
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomationLog {
    #[serde(default)]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<H256>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_op_hash: Option<H256>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Clone, Debug)]
pub struct AutomationsClient {
    http: Client,
    url: String,
    api_key: String,
    pub account: AutomationAccount,
}

impl AutomationsClient {
    pub fn new(api_key: &str, account: AutomationAccount) -> Self {
        Self::with_url(URL, api_key, account)
    }

    pub fn with_url(url: &str, api_key: &str, account: AutomationAccount) -> Self {
        Self {
            http: Client::new(),
            url: url.trim_end_matches('/').into(),
            api_key: api_key.into(),
            account,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.header(API_KEY_HEADER, &self.api_key).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!("Automations response ({status}): {body}");

        if !status.is_success() {
            return Err(ClientError::Http { status: status.as_u16(), body });
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn create_automation(
        &self,
        request: &AutomationRequest,
    ) -> Result<Automation, ClientError> {
        let body = CreateAutomationBody { account: &self.account, request };
        let automation: Automation =
            self.send(self.http.post(format!("{}/automations", self.url)).json(&body)).await?;
        info!("Automation {} created for {:?}", automation.id, self.account.account);
        Ok(automation)
    }

    /// Activates the automation with the account's ERC-1271 signature of its hash
    pub async fn sign_automation(
        &self,
        automation_id: &str,
        signature: &Bytes,
    ) -> Result<Automation, ClientError> {
        let request = self
            .http
            .post(format!("{}/automations/{automation_id}/sign", self.url))
            .json(&SignAutomationBody { signature });
        let automation: Automation = self.send(request).await?;
        info!("Automation {automation_id} signed");
        Ok(automation)
    }

    pub async fn get_automation(&self, automation_id: &str) -> Result<Automation, ClientError> {
        self.send(self.http.get(format!("{}/automations/{automation_id}", self.url))).await
    }

    pub async fn get_automation_logs(
        &self,
        automation_id: &str,
    ) -> Result<Vec<AutomationLog>, ClientError> {
        self.send(self.http.get(format!("{}/automations/{automation_id}/logs", self.url))).await
    }
}
