//! Element trees with live style resolution.
//!
//! A [`Document`] holds the style registries and the stylesheet. Elements
//! created from it carry states, groups, a parent link, an optional template
//! role and a local [`StatefulStyle`](cascade::StatefulStyle). Each element's
//! [`ElementStyleView`] combines all of these into one reactive value per
//! attribute.
//!
//! ```
//! use cascade::{AttributeSpec, StateExpression, StyleCondition, StyleContext};
//! use elements::Document;
//!
//! let mut cx = StyleContext::new();
//! let opacity = cx.register_attribute(AttributeSpec::new("paint", "opacity", 1.0_f64)).unwrap();
//! let button_type = cx.register_type("Button", None).unwrap();
//!
//! let document = Document::new(cx);
//! document
//!     .sheet()
//!     .set(
//!         &opacity,
//!         StyleCondition::new()
//!             .with_type(button_type.clone())
//!             .with_state(StateExpression::state("hovered")),
//!         0.5,
//!     )
//!     .unwrap();
//!
//! let button = document.create(&button_type);
//! let value = button.style_view().value(&opacity);
//! assert_eq!(value.get(), 1.0);
//!
//! button.add_state("hovered");
//! assert_eq!(value.get(), 0.5);
//! ```

pub mod document;
pub mod element;
pub mod error;
pub mod log_init;
pub mod states;
pub mod view;

pub use document::Document;
pub use element::Element;
pub use error::{ElementError, Result};
pub use states::PseudoStates;
pub use view::ElementStyleView;
