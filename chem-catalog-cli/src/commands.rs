//! Subcommand bodies. Each runs against any `CatalogApi` and writes its
//! report to the given writer so they can be driven from tests.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use tracing::debug;

use chem_catalog_core::{
    Attachment, CatalogApi, CatalogStore, CatalogView, CreateWorkflow, FieldErrors, FormEvent, Product, ProductField,
    ProductFormState, SessionStore, SubmitOutcome, UpdateWorkflow,
};

/// Product fields accepted by `add` and `update`.
#[derive(Args, Debug, Default, Clone)]
pub struct ProductArgs {
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub sub_category: Option<String>,
    /// Product name
    #[arg(long)]
    pub name: Option<String>,
    /// CAS registry number
    #[arg(long)]
    pub cas: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    /// Safety data sheet to upload
    #[arg(long, value_name = "PATH")]
    pub sds: Option<PathBuf>,
    /// Technical data sheet to upload
    #[arg(long, value_name = "PATH")]
    pub tds: Option<PathBuf>,
}

impl ProductArgs {
    fn events(&self) -> Vec<FormEvent> {
        let texts = [
            (ProductField::Category, &self.category),
            (ProductField::SubCategory, &self.sub_category),
            (ProductField::Name, &self.name),
            (ProductField::Cas, &self.cas),
            (ProductField::Description, &self.description),
        ];
        let files = [(ProductField::Sds, &self.sds), (ProductField::Tds, &self.tds)];

        texts
            .into_iter()
            .filter_map(|(field, value)| value.clone().map(|v| FormEvent::Changed(field, v)))
            .chain(
                files
                    .into_iter()
                    .filter_map(|(field, path)| path.clone().map(|p| FormEvent::FileSelected(field, p))),
            )
            .collect()
    }
}

fn attachment_label(attachment: &Attachment) -> &str {
    attachment.stored_url().unwrap_or("-")
}

fn write_product(out: &mut impl Write, product: &Product) -> Result<()> {
    writeln!(
        out,
        "{}\t{}\t{}\t{} / {}\tsds: {}\ttds: {}",
        product.id,
        product.name,
        product.cas,
        product.category,
        product.sub_category,
        attachment_label(&product.sds),
        attachment_label(&product.tds),
    )?;
    Ok(())
}

fn write_field_errors(out: &mut impl Write, errors: &FieldErrors) -> Result<()> {
    for (field, message) in errors.iter() {
        writeln!(out, "  {}: {message}", field.label())?;
    }
    Ok(())
}

pub async fn list(api: &dyn CatalogApi, json: bool, out: &mut impl Write) -> Result<()> {
    let products = api.list_products().await.context("listing products")?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &products)?;
        writeln!(out)?;
        return Ok(());
    }

    if products.is_empty() {
        writeln!(out, "No products yet")?;
    }
    for product in &products {
        write_product(out, product)?;
    }
    Ok(())
}

pub async fn categories(api: &dyn CatalogApi, out: &mut impl Write) -> Result<()> {
    let mut form = ProductFormState::new();
    form.load_categories(api).await;
    if let Some(error) = form.error() {
        bail!("{error}");
    }
    for category in form.categories() {
        writeln!(out, "{}", category.name)?;
    }
    Ok(())
}

pub async fn sub_categories(api: &dyn CatalogApi, category: &str, out: &mut impl Write) -> Result<()> {
    let mut form = ProductFormState::new();
    form.select_category(category, api).await;
    if let Some(error) = form.error() {
        bail!("{error}");
    }
    for sub in form.sub_categories() {
        writeln!(out, "{}", sub.name)?;
    }
    Ok(())
}

pub async fn add(api: &dyn CatalogApi, args: &ProductArgs, out: &mut impl Write) -> Result<()> {
    let mut workflow = CreateWorkflow::new();
    workflow.open();
    for event in args.events() {
        workflow.apply_event(event);
    }
    // Unreadable files surface as field errors before any request.
    if !workflow.errors().is_empty() {
        writeln!(out, "Cannot add product:")?;
        write_field_errors(out, workflow.errors())?;
        bail!("{} field(s) invalid", workflow.errors().len());
    }

    let mut store = CatalogStore::new();
    match workflow.submit(api, &mut store, || {}).await {
        SubmitOutcome::Saved => {
            if let Some(product) = store.products().last() {
                writeln!(out, "Created {} ({})", product.name, product.id)?;
            }
            Ok(())
        }
        SubmitOutcome::Invalid => {
            writeln!(out, "Cannot add product:")?;
            write_field_errors(out, workflow.errors())?;
            bail!("{} field(s) invalid", workflow.errors().len())
        }
        SubmitOutcome::Failed(message) => bail!("{message}"),
        SubmitOutcome::Ignored => bail!("submission was ignored"),
    }
}

async fn find_product(api: &dyn CatalogApi, id: &str) -> Result<(CatalogStore, Product)> {
    let mut store = CatalogStore::new();
    let mut view = CatalogView::new();
    view.reload(api, &mut store).await;
    if let chem_catalog_core::ListStatus::Failed(message) = view.status() {
        bail!("{message}");
    }
    let product = store
        .get(id)
        .cloned()
        .with_context(|| format!("Product {id} not found"))?;
    Ok((store, product))
}

pub async fn update(api: &dyn CatalogApi, id: &str, args: &ProductArgs, out: &mut impl Write) -> Result<()> {
    let (_, product) = find_product(api, id).await?;
    debug!("updating {} ({})", product.name, product.id);

    let mut workflow = UpdateWorkflow::new();
    workflow.select(&product);
    workflow.open();
    for event in args.events() {
        workflow.apply_event(event);
    }
    if !workflow.errors().is_empty() {
        writeln!(out, "Cannot update product:")?;
        write_field_errors(out, workflow.errors())?;
        bail!("{} field(s) invalid", workflow.errors().len());
    }

    match workflow.submit(api, || {}).await {
        SubmitOutcome::Saved => {
            writeln!(out, "Updated {id}")?;
            Ok(())
        }
        SubmitOutcome::Invalid => {
            writeln!(out, "Cannot update product:")?;
            write_field_errors(out, workflow.errors())?;
            bail!("{} field(s) invalid", workflow.errors().len())
        }
        SubmitOutcome::Failed(message) => bail!("{message}"),
        SubmitOutcome::Ignored => bail!(workflow.api_error().unwrap_or("submission was ignored").to_string()),
    }
}

pub async fn delete(api: &dyn CatalogApi, id: &str, out: &mut impl Write) -> Result<()> {
    let (mut store, product) = find_product(api, id).await?;

    let mut view = CatalogView::new();
    view.request_delete(&product);
    if view.confirm_delete(api, &mut store).await {
        if let Some(notice) = view.notice() {
            writeln!(out, "{notice}")?;
        }
        return Ok(());
    }

    let message = view
        .pending_delete()
        .and_then(|pending| pending.error.clone())
        .unwrap_or_else(|| "Delete failed".to_string());
    bail!("{message}")
}

pub fn session_set(session: &SessionStore, token: &str, out: &mut impl Write) -> Result<()> {
    if token.trim().is_empty() {
        bail!("token must not be empty");
    }
    session.save_token(token)?;
    match session.path() {
        Some(path) => writeln!(out, "Token saved to {}", path.display())?,
        None => writeln!(out, "Token saved")?,
    }
    Ok(())
}

pub fn session_clear(session: &SessionStore, out: &mut impl Write) -> Result<()> {
    session.clear()?;
    writeln!(out, "Session cleared")?;
    Ok(())
}

pub fn session_show(session: &SessionStore, out: &mut impl Write) -> Result<()> {
    match session.token()? {
        Some(token) => writeln!(out, "Token: {}", mask(&token))?,
        None => writeln!(out, "No token stored")?,
    }
    if let Some(path) = session.path() {
        writeln!(out, "Session file: {}", path.display())?;
    }
    Ok(())
}

/// Show only the last four characters.
fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}{tail}", "*".repeat(chars.len() - 4))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_harness::fixtures::sample_products;
    use test_harness::{FakeCatalogApi, Failure, Operation, RecordedCall};

    fn output(buf: Vec<u8>) -> String {
        String::from_utf8(buf).unwrap()
    }

    fn acetone() -> ProductArgs {
        ProductArgs {
            category: Some("Solvents".into()),
            sub_category: Some("Ketones".into()),
            name: Some("Acetone".into()),
            cas: Some("67-64-1".into()),
            description: Some("ACS reagent grade".into()),
            ..ProductArgs::default()
        }
    }

    #[tokio::test]
    async fn list_prints_one_line_per_product() {
        let api = FakeCatalogApi::with_fixtures();
        let mut out = Vec::new();

        list(&api, false, &mut out).await.unwrap();

        let text = output(out);
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("6650a1\tEthanol\t64-17-5\tSolvents / Alcohols"));
        assert!(text.contains("sds: https://files.example.com/ethanol_sds.pdf"));
    }

    #[tokio::test]
    async fn list_json_round_trips_wire_names() {
        let api = FakeCatalogApi::with_fixtures();
        let mut out = Vec::new();

        list(&api, true, &mut out).await.unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value[0]["_id"], "6650a1");
        assert_eq!(value[0]["product"], "Ethanol");
        assert_eq!(value[0]["subCategory"], "Alcohols");
    }

    #[tokio::test]
    async fn sub_categories_are_filtered_to_the_category() {
        let api = FakeCatalogApi::with_fixtures();
        let mut out = Vec::new();

        sub_categories(&api, "Solvents", &mut out).await.unwrap();

        assert_eq!(output(out), "Alcohols\nKetones\n");
    }

    #[tokio::test]
    async fn categories_failure_is_reported() {
        let api = FakeCatalogApi::with_fixtures();
        api.fail_next(Operation::ListCategories, Failure::Server(500));

        let err = categories(&api, &mut Vec::new()).await.unwrap_err();

        assert_eq!(err.to_string(), "Failed to load categories");
    }

    #[tokio::test]
    async fn add_reports_each_missing_field_without_calling_the_service() {
        let api = FakeCatalogApi::new();
        let args = ProductArgs {
            name: Some("Acetone".into()),
            ..ProductArgs::default()
        };
        let mut out = Vec::new();

        let err = add(&api, &args, &mut out).await.unwrap_err();

        let text = output(out);
        assert!(text.contains("Category: Category is required"));
        assert!(text.contains("CAS Number: CAS number is required"));
        assert!(!text.contains("Product name is required"));
        assert_eq!(err.to_string(), "4 field(s) invalid");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn add_uploads_the_data_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let sds = dir.path().join("acetone_sds.pdf");
        std::fs::write(&sds, b"%PDF-1.4").unwrap();
        let api = FakeCatalogApi::new();
        let args = ProductArgs {
            sds: Some(sds),
            ..acetone()
        };
        let mut out = Vec::new();

        add(&api, &args, &mut out).await.unwrap();

        assert_eq!(output(out), "Created Acetone (fake-1)\n");
        let created = &api.products()[0];
        assert_eq!(created.sds.stored_url(), Some("uploads/acetone_sds.pdf"));
    }

    #[tokio::test]
    async fn add_surfaces_the_server_message() {
        let api = FakeCatalogApi::new();
        api.fail_next(Operation::Create, Failure::Rejected("CAS exists".into()));

        let err = add(&api, &acetone(), &mut Vec::new()).await.unwrap_err();

        assert_eq!(err.to_string(), "CAS exists");
    }

    #[tokio::test]
    async fn update_applies_only_the_overrides() {
        let api = FakeCatalogApi::with_fixtures();
        let args = ProductArgs {
            description: Some("Absolute ethanol".into()),
            ..ProductArgs::default()
        };
        let mut out = Vec::new();

        update(&api, "6650a1", &args, &mut out).await.unwrap();

        assert_eq!(output(out), "Updated 6650a1\n");
        let sent = api
            .calls()
            .into_iter()
            .find_map(|call| match call {
                RecordedCall::Update(id, draft) => Some((id, draft)),
                _ => None,
            })
            .unwrap();
        assert_eq!(sent.0, "6650a1");
        assert_eq!(sent.1.description, "Absolute ethanol");
        assert_eq!(sent.1.name, sample_products()[0].name);
        assert_eq!(sent.1.sds, sample_products()[0].sds);
    }

    #[tokio::test]
    async fn update_of_unknown_product_fails_before_sending() {
        let api = FakeCatalogApi::with_fixtures();

        let err = update(&api, "missing", &ProductArgs::default(), &mut Vec::new())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Product missing not found");
        assert_eq!(api.call_count(Operation::Update), 0);
    }

    #[tokio::test]
    async fn delete_prints_notice() {
        let api = FakeCatalogApi::with_fixtures();
        let mut out = Vec::new();

        delete(&api, "6650a2", &mut out).await.unwrap();

        assert_eq!(output(out), "Deleted Acetic Acid\n");
        assert_eq!(api.products().len(), 2);
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_record() {
        let api = FakeCatalogApi::with_fixtures();
        api.fail_next(Operation::Delete, Failure::Rejected("Product is referenced".into()));

        let err = delete(&api, "6650a2", &mut Vec::new()).await.unwrap_err();

        assert_eq!(err.to_string(), "Product is referenced");
        assert_eq!(api.products().len(), 3);
    }

    #[test]
    fn session_round_trip_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let session = SessionStore::open(dir.path().join("nested").join("session.json"));
        let mut out = Vec::new();

        session_set(&session, "abcdef123456", &mut out).unwrap();
        session_show(&session, &mut out).unwrap();
        session_clear(&session, &mut out).unwrap();

        let text = output(out);
        assert!(text.contains("Token saved to"));
        assert!(text.contains("Token: ********3456"));
        assert!(text.contains("Session cleared"));
    }

    #[test]
    fn mask_hides_short_tokens_entirely() {
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask("abcdef"), "**cdef");
    }
}
