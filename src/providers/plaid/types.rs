// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Request and response bodies for the Plaid endpoints this service calls.
//!
//! Only the fields the quickstart reads or sends are modelled. Optional
//! request fields are skipped when unset so Plaid never sees explicit nulls.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::PlaidError;

// =============================================================================
// Common
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Language {
    #[serde(rename = "da")]
    Danish,
    #[serde(rename = "nl")]
    Dutch,
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "no")]
    Norwegian,
    #[serde(rename = "pl")]
    Polish,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "sv")]
    Swedish,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum CountryCode {
    Be,
    Ca,
    De,
    Dk,
    Es,
    Fr,
    Gb,
    Ie,
    It,
    Nl,
    No,
    Pl,
    Pt,
    Se,
    #[default]
    Us,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Product {
    Assets,
    Auth,
    Balance,
    BalancePlus,
    Beacon,
    CreditDetails,
    DepositSwitch,
    Employment,
    Identity,
    IdentityMatch,
    IdentityVerification,
    Income,
    IncomeVerification,
    Investments,
    InvestmentsAuth,
    Layer,
    Liabilities,
    PaymentInitiation,
    ProcessorIdentity,
    ProcessorPayments,
    Profile,
    RecurringTransactions,
    Signal,
    StandingOrders,
    Statements,
    Transactions,
    Transfer,
    /// Products Plaid adds after this list was written.
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Link token
// =============================================================================

/// Phone number in E.164 form: `+`, then 2 to 15 digits, no leading zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct E164PhoneNumber(String);

impl E164PhoneNumber {
    pub fn parse(raw: &str) -> Result<Self, PlaidError> {
        let trimmed = raw.trim();
        let valid = trimmed
            .strip_prefix('+')
            .filter(|digits| (2..=15).contains(&digits.len()))
            .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
            .is_some_and(|digits| !digits.starts_with('0'));

        if valid {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(PlaidError::InvalidPhoneNumber(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for E164PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for E164PhoneNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// End user the link token is minted for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct LinkTokenUser {
    pub client_user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<E164PhoneNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
}

/// Body of `/link/token/create`, minus credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkTokenCreateRequest {
    pub client_name: String,
    pub language: Language,
    pub country_codes: Vec<CountryCode>,
    pub user: LinkTokenUser,
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_customization_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub android_package_name: Option<String>,
}

impl LinkTokenCreateRequest {
    /// English, US institutions, `auth` product.
    pub fn new(client_name: impl Into<String>, user: LinkTokenUser) -> Self {
        Self {
            client_name: client_name.into(),
            language: Language::English,
            country_codes: vec![CountryCode::Us],
            user,
            products: vec![Product::Auth],
            webhook: None,
            access_token: None,
            link_customization_name: None,
            redirect_uri: None,
            android_package_name: None,
        }
    }

    pub fn with_redirect_uri(mut self, redirect_uri: Option<String>) -> Self {
        self.redirect_uri = redirect_uri;
        self
    }

    pub fn with_android_package_name(mut self, package_name: Option<String>) -> Self {
        self.android_package_name = package_name;
        self
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LinkTokenCreateResponse {
    pub link_token: String,
    pub expiration: DateTime<Utc>,
    pub request_id: String,
    #[serde(default)]
    pub hosted_link_url: Option<String>,
}

// =============================================================================
// Items
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemPublicTokenExchangeRequest {
    pub public_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemPublicTokenExchangeResponse {
    pub access_token: String,
    pub item_id: String,
    pub request_id: String,
}

// =============================================================================
// Accounts
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountsBalanceGetRequestOptions {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub account_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_last_updated_datetime: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AccountsBalanceGetRequest {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<AccountsBalanceGetRequestOptions>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Depository,
    Credit,
    Loan,
    Investment,
    Brokerage,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub available: Option<f64>,
    pub current: Option<f64>,
    pub limit: Option<f64>,
    pub iso_currency_code: Option<String>,
    pub unofficial_currency_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated_datetime: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: String,
    pub balances: AccountBalance,
    pub mask: Option<String>,
    pub name: String,
    pub official_name: Option<String>,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub subtype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_account_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemUpdateType {
    Background,
    UserPresentRequired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountItem {
    pub item_id: String,
    pub institution_id: Option<String>,
    pub webhook: Option<String>,
    pub error: Option<PlaidErrorResponse>,
    pub available_products: Vec<Product>,
    #[serde(default)]
    pub billed_products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consented_products: Option<Vec<Product>>,
    pub consent_expiration_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_type: Option<ItemUpdateType>,
}

/// Body returned by `/accounts/balance/get`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountsGetResponse {
    pub accounts: Vec<Account>,
    pub item: AccountItem,
    pub request_id: String,
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlaidErrorType {
    ApiError,
    AssetReportError,
    BankTransferError,
    InstitutionError,
    InvalidInput,
    InvalidRequest,
    InvalidResult,
    ItemError,
    OauthError,
    PaymentError,
    RateLimitExceeded,
    RecaptchaError,
    SandboxError,
    TransactionsError,
    TransferError,
    #[serde(other)]
    Unknown,
}

/// Error envelope Plaid returns with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaidErrorResponse {
    pub error_type: PlaidErrorType,
    pub error_code: String,
    pub error_message: String,
    #[serde(default)]
    pub display_message: Option<String>,
    #[serde(default)]
    pub error_code_reason: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<Value>,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub documentation_url: Option<String>,
    #[serde(default)]
    pub suggested_action: Option<String>,
}
