//! Tools module - the premium lookup the model may call
//!
//! - `Tool` trait: the interface a callable tool implements
//! - `ToolInvoker`: runs model tool calls against the one registered tool
//! - `PremiumLookupTool`: the `premium_filter` tool over a `PremiumTable`
//! - `normalize`: typed normalization of loose age/gender/cancer/option input
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use premiumbot::session::ToolCall;
//! use premiumbot::tools::{PremiumLookupTool, PremiumTable, ToolInvoker};
//!
//! # tokio_test::block_on(async {
//! let table = PremiumTable::from_json_str(r#"[
//!     {"Age": "30", "Cancer_type": "Lung Cancer", "Stage": "Early Stage", "Gender": "Male",
//!      "Option A": "100", "Option B": "80", "Option C": "50"}
//! ]"#).unwrap();
//! let invoker = ToolInvoker::new(Arc::new(PremiumLookupTool::new(Arc::new(table))));
//!
//! let call = ToolCall::new(
//!     "call_1",
//!     "premium_filter",
//!     r#"{"age": "30", "cancer": "lung cancer", "gender": "male"}"#,
//! );
//! let text = invoker.invoke(&call).await;
//! assert!(text.contains("The Premium plan is IDR 100"));
//! # });
//! ```

mod invoker;
pub mod normalize;
pub mod premium;
pub mod table;
mod types;

pub use invoker::ToolInvoker;
pub use premium::{PremiumLookupTool, PremiumQuery};
pub use table::{PremiumRow, PremiumTable};
pub use types::Tool;
