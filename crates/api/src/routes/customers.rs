//! Customer account routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::customer::{
    CreateCustomerRequest, CreateCustomerResponse, Customer, CustomerLookup,
    DeleteCustomerRequest, SuccessResponse, UpdateCustomerRequest, UpdateCustomerResponse,
    VerifyCustomerRequest,
};
use persistence::db::is_undefined_table;
use persistence::entities::CustomerEntity;
use persistence::repositories::{CustomerRepository, CustomerUpdate, UpdateOutcome};
use shared::password::{generate_temporary_password, hash_password, verify_any};
use shared::validation::normalize_email;
use tracing::{info, warn};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{AppJson, ClientIp};
use crate::middleware::metrics::{record_customer_created, record_login};

/// List all customers, oldest first.
///
/// GET /api/customers
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    let repo = CustomerRepository::new(state.pool.clone());

    match repo.list().await {
        Ok(customers) => Ok(Json(customers.into_iter().map(Customer::from).collect())),
        Err(e) if is_undefined_table(&e) => {
            warn!("customers table missing, returning empty list");
            Ok(Json(Vec::new()))
        }
        Err(e) => Err(e.into()),
    }
}

/// Create a customer account.
///
/// POST /api/customers
///
/// Self sign-up requires a password. With `adminCreate` the password may be
/// omitted; a temporary one is generated and returned once.
pub async fn create_customer(
    State(state): State<AppState>,
    AppJson(request): AppJson<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<CreateCustomerResponse>), ApiError> {
    request.validate()?;

    let (password, temporary_password) = match request.supplied_password() {
        Some(password) => (password.to_string(), None),
        None if request.admin_create => {
            let generated = generate_temporary_password();
            (generated.clone(), Some(generated))
        }
        None => return Err(ApiError::Validation("Password is required".into())),
    };

    let repo = CustomerRepository::new(state.pool.clone());
    let email = normalize_email(&request.email);

    if repo.email_exists(&email).await? {
        return Err(ApiError::Conflict("Email already registered".into()));
    }

    let password_hash = hash_password(&password)?;
    let entity = repo
        .create(
            request.name.trim(),
            &email,
            Some(&password_hash),
            state.config.store.starting_points,
        )
        .await
        .map_err(email_conflict)?;

    record_customer_created();
    info!(
        customer_id = %entity.id,
        admin_create = request.admin_create,
        "Customer created"
    );

    Ok((
        StatusCode::CREATED,
        Json(CreateCustomerResponse {
            customer: entity.into(),
            temporary_password,
        }),
    ))
}

/// Update a customer.
///
/// PUT /api/customers
///
/// `points` is written as supplied; storefront purchases go through
/// `/api/checkout` instead.
pub async fn update_customer(
    State(state): State<AppState>,
    AppJson(request): AppJson<UpdateCustomerRequest>,
) -> Result<Json<UpdateCustomerResponse>, ApiError> {
    request.validate()?;

    let repo = CustomerRepository::new(state.pool.clone());
    let email = request
        .email
        .as_deref()
        .map(normalize_email)
        .filter(|e| !e.is_empty());

    if let Some(email) = email.as_deref() {
        if let Some(existing) = repo.find_by_email(email).await? {
            if existing.id != request.id {
                return Err(ApiError::Conflict("Email already registered".into()));
            }
        }
    }

    let password_hash = request.new_password().map(hash_password).transpose()?;

    let update = CustomerUpdate {
        name: request.name.trim(),
        email: email.as_deref(),
        points: request.points,
        unlimited: request.unlimited,
        password_hash: password_hash.as_deref(),
        expected_revision: request.revision,
    };

    match repo.update(request.id, &update).await.map_err(email_conflict)? {
        UpdateOutcome::Updated(entity) => {
            info!(
                customer_id = %entity.id,
                points = entity.points,
                unlimited = entity.unlimited,
                password_changed = update.password_hash.is_some(),
                "Customer updated"
            );
            Ok(Json(UpdateCustomerResponse {
                success: true,
                customer: entity.into(),
            }))
        }
        UpdateOutcome::NotFound => Err(ApiError::NotFound("Customer not found".into())),
        UpdateOutcome::Stale => Err(ApiError::Conflict(
            "Customer was modified by someone else. Reload and try again.".into(),
        )),
    }
}

/// Delete a customer. Their orders and messages are kept.
///
/// DELETE /api/customers
pub async fn delete_customer(
    State(state): State<AppState>,
    AppJson(request): AppJson<DeleteCustomerRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let repo = CustomerRepository::new(state.pool.clone());

    if repo.delete(request.id).await? == 0 {
        return Err(ApiError::NotFound("Customer not found".into()));
    }

    info!(customer_id = %request.id, "Customer deleted");
    Ok(Json(SuccessResponse::ok()))
}

/// Verify a customer's password (sign-in).
///
/// POST /api/customers/verify
///
/// An account without a stored password takes the supplied one. Accounts
/// still on the legacy encoding are rehashed after a successful check.
pub async fn verify_customer(
    State(state): State<AppState>,
    ClientIp(client_ip): ClientIp,
    AppJson(request): AppJson<VerifyCustomerRequest>,
) -> Result<Json<Customer>, ApiError> {
    let password = request.password.trim();
    if password.is_empty() {
        return Err(ApiError::Validation("Missing password".into()));
    }
    let lookup = request
        .lookup()
        .ok_or_else(|| ApiError::Validation("Missing id or email".into()))?;

    let repo = CustomerRepository::new(state.pool.clone());
    let found = match &lookup {
        CustomerLookup::ByEmail(email) => repo.find_by_email(email).await,
        CustomerLookup::ById(id) => repo.find_by_id(*id).await,
    };
    let customer = match found {
        Ok(Some(customer)) => customer,
        Ok(None) => {
            record_login("unknown_account");
            return Err(ApiError::NotFound(
                "Account not found. Please check your email or sign up.".into(),
            ));
        }
        Err(e) if is_undefined_table(&e) => {
            return Err(ApiError::ServiceUnavailable(
                "Database not initialized. Please try again.".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let customer = match customer.password_hash.clone() {
        Some(stored) => check_password(&repo, customer, &stored, password).await?,
        None => set_first_password(&repo, customer, password).await?,
    };

    record_login("success");
    info!(
        customer_id = %customer.id,
        client_ip = ?client_ip,
        "Customer verified"
    );
    Ok(Json(customer.into()))
}

async fn check_password(
    repo: &CustomerRepository,
    customer: CustomerEntity,
    stored: &str,
    password: &str,
) -> Result<CustomerEntity, ApiError> {
    let (matches, needs_rehash) = verify_any(password, stored)?;
    if !matches {
        record_login("invalid_password");
        warn!(customer_id = %customer.id, "Invalid password");
        return Err(ApiError::Unauthorized(
            "Invalid password. Please try again.".into(),
        ));
    }

    if needs_rehash {
        // The sign-in already succeeded; a failed upgrade is retried next time.
        match hash_password(password) {
            Ok(new_hash) => match repo.replace_password_hash(customer.id, stored, &new_hash).await {
                Ok(true) => info!(customer_id = %customer.id, "Legacy password upgraded"),
                Ok(false) => {}
                Err(e) => warn!(customer_id = %customer.id, error = %e, "Password upgrade failed"),
            },
            Err(e) => warn!(customer_id = %customer.id, error = %e, "Password upgrade failed"),
        }
    }

    Ok(customer)
}

async fn set_first_password(
    repo: &CustomerRepository,
    customer: CustomerEntity,
    password: &str,
) -> Result<CustomerEntity, ApiError> {
    let new_hash = hash_password(password)?;
    if repo.set_initial_password(customer.id, &new_hash).await? {
        info!(customer_id = %customer.id, "Initial password set");
        return Ok(customer);
    }

    // Another request set a password first; check against that one.
    let current = repo
        .find_by_id(customer.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Customer not found".into()))?;
    match current.password_hash.clone() {
        Some(stored) => check_password(repo, current, &stored, password).await,
        None => Err(ApiError::Internal("Password could not be stored".into())),
    }
}

/// Maps unique violations on the email index to a readable conflict.
fn email_conflict(err: sqlx::Error) -> ApiError {
    match ApiError::from(err) {
        ApiError::Conflict(_) => ApiError::Conflict("Email already registered".into()),
        other => other,
    }
}
