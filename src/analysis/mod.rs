/// Analysis layer: pure functions from a [`crate::data::model::Table`] to
/// plain, serializable results.
///
/// ```text
///   Table ──► profile / missing / numeric
///                          │
///                          ▼
///              correlation / standardize
///                          │
///                          ▼
///               pca / outlier / pairplot
/// ```
///
/// `pipeline` chains them for one table + control state. No step mutates
/// its input and failures stay local to their section.

pub mod correlation;
pub mod missing;
pub mod numeric;
pub mod outlier;
pub mod pairplot;
pub mod pca;
pub mod pipeline;
pub mod profile;
pub mod standardize;
