//! Product entry and edit forms.
//!
//! A rejected submission re-renders the form with every value the user typed,
//! the images already accepted, and a message per failing field. When the
//! products API refuses a valid draft, its message is shown above the form.

use askama::Template;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use luxe_client::ApiError;
use luxe_core::{Category, CategoryId, ProductDraft, ProductId};
use tracing::instrument;

use super::products::{Notice, parse_id};
use super::{CategoryOption, render};
use crate::error::{AppError, Result};
use crate::filters;
use crate::forms::{FormErrors, ProductForm, ProductFormValues, RejectedForm};
use crate::state::AppState;

/// Product form page template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub heading: &'static str,
    pub action: String,
    pub submit_label: &'static str,
    pub values: ProductFormValues,
    pub errors: FormErrors,
    pub categories: Vec<CategoryOption>,
    /// Images carried over from the product or a previous attempt.
    pub images: Vec<String>,
}

/// Which form is being shown.
#[derive(Debug, Clone, Copy)]
enum FormMode {
    Create,
    Edit(ProductId),
}

impl FormMode {
    fn template(
        self,
        values: ProductFormValues,
        images: Vec<String>,
        errors: FormErrors,
        categories: &[Category],
    ) -> ProductFormTemplate {
        let selected = values.category_id.parse::<CategoryId>().ok();
        let (heading, action, submit_label) = match self {
            Self::Create => ("Add New Product", "/products".to_string(), "Create Product"),
            Self::Edit(id) => ("Edit Product", format!("/products/{id}"), "Save Changes"),
        };

        ProductFormTemplate {
            heading,
            action,
            submit_label,
            values,
            errors,
            categories: CategoryOption::by_id(categories, selected),
            images,
        }
    }
}

/// Render a rejected form with the given status.
fn rejected(
    mode: FormMode,
    form: RejectedForm,
    categories: &[Category],
    status: StatusCode,
) -> Result<Response> {
    let template = mode.template(form.values, form.images, form.errors, categories);
    Ok((status, render(&template)?).into_response())
}

/// Shared create/update flow: read the form, validate, then send.
async fn submit<F, Fut>(
    state: &AppState,
    mode: FormMode,
    multipart: Multipart,
    send: F,
) -> Result<Response>
where
    F: FnOnce(ProductDraft) -> Fut,
    Fut: Future<Output = std::result::Result<ProductDraft, (ProductDraft, ApiError)>>,
{
    let form = ProductForm::from_multipart(multipart).await?;

    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(form) => {
            tracing::debug!(fields = form.errors.field_count(), "Product form rejected");
            let categories = state.api().get_categories().await;
            return rejected(mode, form, &categories, StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    match send(draft).await {
        Ok(_) => Ok(match mode {
            FormMode::Create => Notice::Created,
            FormMode::Edit(_) => Notice::Updated,
        }
        .redirect()
        .into_response()),
        Err((draft, error)) => {
            let mut errors = FormErrors::default();
            errors.general = Some(error.user_message());
            let form = RejectedForm {
                values: ProductFormValues::from_draft(&draft),
                images: draft.images,
                errors,
            };
            let categories = state.api().get_categories().await;
            rejected(mode, form, &categories, StatusCode::BAD_GATEWAY)
        }
    }
}

/// New product form.
#[instrument(skip(state))]
pub async fn new(State(state): State<AppState>) -> Result<Html<String>> {
    let categories = state.api().get_categories().await;
    let template = FormMode::Create.template(
        ProductFormValues::default(),
        Vec::new(),
        FormErrors::default(),
        &categories,
    );
    render(&template)
}

/// Create a product from the entry form.
#[instrument(skip(state, multipart))]
pub async fn create(State(state): State<AppState>, multipart: Multipart) -> Result<Response> {
    let api = state.api().clone();
    submit(&state, FormMode::Create, multipart, |draft| async move {
        match api.create_product(&draft).await {
            Ok(created) => {
                tracing::info!(
                    product_id = ?created.as_ref().map(|p| p.id),
                    name = %draft.name,
                    "Product created"
                );
                Ok(draft)
            }
            Err(e) => Err((draft, e)),
        }
    })
    .await
}

/// Edit form for an existing product.
#[instrument(skip(state))]
pub async fn edit(State(state): State<AppState>, Path(id): Path<String>) -> Result<Html<String>> {
    let id = parse_id(&id)?;

    let (product, categories) = tokio::join!(
        state.api().get_product_by_id(id),
        state.api().get_categories(),
    );
    let product = product.ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let draft = ProductDraft::from_product(&product);
    let template = FormMode::Edit(id).template(
        ProductFormValues::from_draft(&draft),
        draft.images,
        FormErrors::default(),
        &categories,
    );
    render(&template)
}

/// Update a product from the edit form.
#[instrument(skip(state, multipart))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let id = parse_id(&id)?;
    let api = state.api().clone();
    submit(&state, FormMode::Edit(id), multipart, |draft| async move {
        match api.update_product(id, &draft).await {
            Ok(_) => {
                tracing::info!(product_id = %id, "Product updated");
                Ok(draft)
            }
            Err(e) => Err((draft, e)),
        }
    })
    .await
}
