//! Client bucketing.
//!
//! - **Attribute buckets**: category, RM, risk profile, city
//! - **Size buckets**: configurable AUM bands
//! - **Custom buckets**: any classifier over [`ClientFacts`](crate::ClientFacts)
//!
//! Every bucket carries count, total AUM, average AUM and weight. Clients
//! the classifier cannot place land in the `unclassified` bucket.

mod bands;
mod distribution;

pub use bands::*;
pub use distribution::*;
