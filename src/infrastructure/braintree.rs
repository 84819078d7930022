//! Braintree GraphQL API client.
//!
//! Implements [`PaymentGateway`] on top of the `createClientToken`,
//! `chargePaymentMethod` and `authorizePaymentMethod` mutations.

use crate::domain::config::{Environment, GatewayCredentials, MethodConfiguration};
use crate::domain::ports::{PaymentGateway, PaymentGatewayRef};
use crate::domain::transaction::{ClientToken, GatewayTransaction, SaleRequest, TransactionResult};
use crate::error::GatewayError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

pub const SANDBOX_URL: &str = "https://payments.sandbox.braintree-api.com/graphql";
pub const PRODUCTION_URL: &str = "https://payments.braintree-api.com/graphql";

pub const BRAINTREE_VERSION: &str = "Braintree-Version";
pub const BRAINTREE_VERSION_VALUE: &str = "2019-01-01";

pub const CLIENT_TOKEN_MUTATION: &str = "mutation createClientToken($input: CreateClientTokenInput!) { createClientToken(input: $input) { clientToken } }";
pub const CHARGE_PAYMENT_METHOD_MUTATION: &str = "mutation chargePaymentMethod($input: ChargePaymentMethodInput!) { chargePaymentMethod(input: $input) { transaction { id legacyId status paymentMethodSnapshot { __typename } } } }";
pub const AUTHORIZE_PAYMENT_METHOD_MUTATION: &str = "mutation authorizePaymentMethod($input: AuthorizePaymentMethodInput!) { authorizePaymentMethod(input: $input) { transaction { id legacyId status paymentMethodSnapshot { __typename } } } }";

#[derive(Debug, Serialize)]
pub struct GraphQlRequest<T> {
    query: &'static str,
    variables: Variables<T>,
}

#[derive(Debug, Serialize)]
pub struct Variables<T> {
    input: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenInput {
    client_token: ClientTokenOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    merchant_account_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeInput {
    payment_method_id: String,
    transaction: TransactionInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInput {
    amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    merchant_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_details: Option<CustomerDetails>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    billing_address: BTreeMap<&'static str, String>,
}

#[derive(Debug, Serialize)]
pub struct CustomerDetails {
    email: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
pub struct GraphQlError {
    message: String,
    #[serde(default)]
    extensions: Option<ErrorExtensions>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExtensions {
    legacy_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenData {
    create_client_token: Option<ClientTokenPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientTokenPayload {
    client_token: String,
}

/// Mutation payloads keyed by mutation name.
pub type TransactionData = HashMap<String, Option<TransactionPayload>>;

#[derive(Debug, Deserialize)]
pub struct TransactionPayload {
    transaction: Option<TransactionNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionNode {
    id: String,
    legacy_id: Option<String>,
    status: String,
    payment_method_snapshot: Option<PaymentMethodSnapshot>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentMethodSnapshot {
    #[serde(rename = "__typename")]
    typename: String,
}

/// Maps a canonical billing key to the GraphQL `AddressInput` field.
fn address_field(key: &str) -> Option<&'static str> {
    Some(match key {
        "company" => "company",
        "countryCodeAlpha2" => "countryCode",
        "extendedAddress" => "extendedAddress",
        "firstName" => "firstName",
        "lastName" => "lastName",
        "locality" => "locality",
        "postalCode" => "postalCode",
        "region" => "region",
        "streetAddress" => "streetAddress",
        _ => return None,
    })
}

/// Payment instrument type as named by the server SDKs.
pub fn instrument_type(typename: &str) -> String {
    match typename {
        "CreditCardDetails" => "credit_card".to_string(),
        "GooglePayCardDetails" => "android_pay_card".to_string(),
        "ApplePayCardDetails" => "apple_pay_card".to_string(),
        "PayPalTransactionDetails" => "paypal_account".to_string(),
        "VenmoAccountDetails" => "venmo_account".to_string(),
        other => {
            let name = other.strip_suffix("Details").unwrap_or(other);
            let mut snake = String::with_capacity(name.len() + 4);
            for (i, c) in name.chars().enumerate() {
                if c.is_ascii_uppercase() {
                    if i > 0 {
                        snake.push('_');
                    }
                    snake.push(c.to_ascii_lowercase());
                } else {
                    snake.push(c);
                }
            }
            snake
        }
    }
}

pub fn client_token_request(merchant_account_id: Option<String>) -> GraphQlRequest<ClientTokenInput> {
    GraphQlRequest {
        query: CLIENT_TOKEN_MUTATION,
        variables: Variables {
            input: ClientTokenInput {
                client_token: ClientTokenOptions {
                    merchant_account_id,
                },
            },
        },
    }
}

pub fn sale_request(request: SaleRequest) -> GraphQlRequest<ChargeInput> {
    let billing_address = request
        .billing
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .filter_map(|(key, value)| address_field(&key).map(|field| (field, value)))
        .collect();
    GraphQlRequest {
        query: if request.submit_for_settlement {
            CHARGE_PAYMENT_METHOD_MUTATION
        } else {
            AUTHORIZE_PAYMENT_METHOD_MUTATION
        },
        variables: Variables {
            input: ChargeInput {
                payment_method_id: request.payment_method_nonce,
                transaction: TransactionInput {
                    amount: request.amount.to_string(),
                    merchant_account_id: request.merchant_account_id,
                    customer_details: request.customer_email.map(|email| CustomerDetails { email }),
                    billing_address,
                },
            },
        },
    }
}

/// Reconciles a sale response into a [`TransactionResult`].
///
/// GraphQL errors make the result unsuccessful; a transaction without errors
/// is successful regardless of its status, which is checked by the caller.
pub fn parse_sale_response(
    response: GraphQlResponse<TransactionData>,
) -> Result<TransactionResult, GatewayError> {
    let transaction = response
        .data
        .into_iter()
        .flat_map(HashMap::into_values)
        .flatten()
        .find_map(|payload| payload.transaction)
        .map(|node| GatewayTransaction {
            id: node.legacy_id.unwrap_or(node.id),
            status: node.status.to_lowercase(),
            payment_instrument_type: node
                .payment_method_snapshot
                .map(|snapshot| instrument_type(&snapshot.typename))
                .unwrap_or_default(),
        });

    if let Some(error) = response.errors.into_iter().next() {
        return Ok(TransactionResult {
            success: false,
            code: error.extensions.and_then(|ext| ext.legacy_code),
            message: error.message,
            transaction,
        });
    }

    match transaction {
        Some(transaction) => Ok(TransactionResult {
            success: true,
            code: None,
            message: String::new(),
            transaction: Some(transaction),
        }),
        None => Err(GatewayError::Malformed(
            "response contains neither a transaction nor errors".to_string(),
        )),
    }
}

/// Gateway client bound to one environment, merchant and key pair.
pub struct BraintreeGateway {
    client: reqwest::Client,
    endpoint: String,
    credentials: GatewayCredentials,
}

impl BraintreeGateway {
    /// Builds the client. Credentials are only checked by the first request.
    pub fn new(credentials: GatewayCredentials) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("braintree-payment/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let endpoint = match credentials.environment {
            Environment::Sandbox => SANDBOX_URL,
            Environment::Production => PRODUCTION_URL,
        };
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            credentials,
        })
    }

    /// Points the client at another GraphQL endpoint, e.g. a local stub.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post<T: Serialize + Sync, R: DeserializeOwned>(
        &self,
        body: &T,
    ) -> Result<GraphQlResponse<R>, GatewayError> {
        let response = self
            .client
            .post(self.endpoint.as_str())
            .basic_auth(
                &self.credentials.public_key,
                Some(&self.credentials.private_key),
            )
            .header(BRAINTREE_VERSION, BRAINTREE_VERSION_VALUE)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GatewayError::Authentication(status.as_u16()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::UnexpectedResponse {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<GraphQlResponse<R>>()
            .await
            .map_err(|e| GatewayError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for BraintreeGateway {
    async fn client_token(
        &self,
        merchant_account_id: Option<String>,
    ) -> Result<ClientToken, GatewayError> {
        debug!(endpoint = %self.endpoint, "Generating client token");
        let response: GraphQlResponse<ClientTokenData> =
            self.post(&client_token_request(merchant_account_id)).await?;
        if let Some(error) = response.errors.into_iter().next() {
            return Err(GatewayError::Rejected(error.message));
        }
        response
            .data
            .and_then(|data| data.create_client_token)
            .map(|payload| ClientToken(payload.client_token))
            .ok_or_else(|| GatewayError::Malformed("missing clientToken".to_string()))
    }

    async fn sale(&self, request: SaleRequest) -> Result<TransactionResult, GatewayError> {
        debug!(endpoint = %self.endpoint, amount = %request.amount, "Submitting transaction");
        let response: GraphQlResponse<TransactionData> =
            self.post(&sale_request(request)).await?;
        parse_sale_response(response)
    }
}

/// Creates the gateway client for a resolved method configuration.
pub fn create_gateway(config: &MethodConfiguration) -> crate::error::Result<PaymentGatewayRef> {
    let gateway = BraintreeGateway::new(config.credentials())?;
    Ok(Arc::new(gateway))
}
