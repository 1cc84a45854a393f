//! Catalog command handlers for the CLI.
//!
//! Results go to stdout as pretty JSON so they can be piped; logs go to
//! stderr. A lookup that finds nothing is an error so the exit code says so.

use atelier_catalog::{
    Catalog, Color, CreateProduct, MediaRef, ProductStatus, ProductView, UpdateProduct,
};
use atelier_store::ObjectStore;
use clap::Args;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub title: String,
    /// Single amount or range, e.g. 1299 or 999-1499
    #[arg(long)]
    pub price: String,
    #[arg(long, default_value = "")]
    pub description: String,
    #[arg(long, default_value = "USD")]
    pub currency: String,
    #[arg(long, default_value = "DRAFT")]
    pub status: ProductStatus,
    /// Uploaded image reference (gid://...), repeatable, in display order
    #[arg(long = "image")]
    pub images: Vec<MediaRef>,
    /// Uploaded video reference (gid://...)
    #[arg(long)]
    pub video: Option<MediaRef>,
    /// Color as NAME=#HEX, repeatable
    #[arg(long = "color")]
    pub colors: Vec<Color>,
    #[arg(long = "size")]
    pub sizes: Vec<String>,
    /// Handle of a related entry, repeatable
    #[arg(long = "related")]
    pub related_handles: Vec<String>,
}

impl From<CreateArgs> for CreateProduct {
    fn from(args: CreateArgs) -> Self {
        CreateProduct {
            title: args.title,
            description: args.description,
            price: args.price,
            currency: args.currency,
            status: args.status,
            images: args.images,
            video: args.video,
            colors: args.colors,
            sizes: args.sizes,
            related_handles: args.related_handles,
        }
    }
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub handle: String,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub price: Option<String>,
    #[arg(long)]
    pub currency: Option<String>,
    #[arg(long)]
    pub status: Option<ProductStatus>,
    /// Replaces the whole color list when given
    #[arg(long = "color")]
    pub colors: Vec<Color>,
    /// Replaces the whole size list when given
    #[arg(long = "size")]
    pub sizes: Vec<String>,
    /// Replaces the whole related list when given
    #[arg(long = "related")]
    pub related_handles: Vec<String>,
}

impl UpdateArgs {
    pub(crate) fn into_request(self) -> (String, UpdateProduct) {
        let request = UpdateProduct {
            title: self.title,
            description: self.description,
            price: self.price,
            currency: self.currency,
            status: self.status,
            colors: non_empty(self.colors),
            sizes: non_empty(self.sizes),
            related_handles: non_empty(self.related_handles),
        };
        (self.handle, request)
    }
}

/// An omitted repeatable flag leaves the stored list untouched.
fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    (!items.is_empty()).then_some(items)
}

/// Returns `true` if any requested image or the requested video is missing
/// from the created view.
pub(crate) fn has_unresolved_media(
    requested_images: usize,
    requested_video: bool,
    view: &ProductView,
) -> bool {
    view.images.len() < requested_images || (requested_video && view.video.is_none())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub(crate) async fn run_list<S: ObjectStore>(catalog: &Catalog<S>) -> anyhow::Result<()> {
    let views = catalog.list_all().await?;
    tracing::info!(count = views.len(), "listed catalog");
    print_json(&views)
}

pub(crate) async fn run_get<S: ObjectStore>(
    catalog: &Catalog<S>,
    handle: Option<&str>,
    slug: Option<&str>,
) -> anyhow::Result<()> {
    let view = match (handle, slug) {
        (Some(handle), _) => catalog
            .get_by_handle(handle)
            .await?
            .ok_or_else(|| anyhow::anyhow!("no catalog entry with handle '{handle}'"))?,
        (None, Some(slug)) => catalog
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| anyhow::anyhow!("no catalog entry with slug '{slug}'"))?,
        (None, None) => anyhow::bail!("either --handle or --slug is required"),
    };
    print_json(&view)
}

pub(crate) async fn run_create<S: ObjectStore>(
    catalog: &Catalog<S>,
    args: CreateArgs,
) -> anyhow::Result<()> {
    let requested_images = args.images.len();
    let requested_video = args.video.is_some();
    let view = catalog.create(args.into()).await?;
    if has_unresolved_media(requested_images, requested_video, &view) {
        tracing::warn!(
            handle = %view.handle,
            resolved_images = view.images.len(),
            requested_images,
            video_resolved = view.video.is_some(),
            "created with unresolved media; run repair-media later to retry"
        );
    }
    print_json(&view)
}

pub(crate) async fn run_update<S: ObjectStore>(
    catalog: &Catalog<S>,
    args: UpdateArgs,
) -> anyhow::Result<()> {
    let (handle, request) = args.into_request();
    let id = catalog.update(&handle, &request).await?;
    print_json(&serde_json::json!({ "id": id, "handle": handle }))
}

pub(crate) async fn run_delete<S: ObjectStore>(
    catalog: &Catalog<S>,
    id: &str,
) -> anyhow::Result<()> {
    let deleted = catalog.delete(id).await?;
    print_json(&serde_json::json!({ "deletedId": deleted }))
}

pub(crate) async fn run_repair_media<S: ObjectStore>(
    catalog: &Catalog<S>,
    handle: &str,
) -> anyhow::Result<()> {
    let view = catalog
        .repair_media(handle)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no catalog entry with handle '{handle}'"))?;
    print_json(&view)
}
