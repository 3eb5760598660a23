//! # Pharmacy Client
//!
//! > **An async client for a hospital pharmacy and inventory backend.**
//!
//! The backend owns every business rule: stock levels, FEFO batch order, alert thresholds,
//! dispense validation and pricing. This crate is the client side of it. It provides typed
//! requests, list and mutation patterns, the batch-aware dispense workflow and scoped
//! handles for downloaded files.
//!
//! ## 🏗️ Design
//!
//! ### One transport actor, many handles
//! All HTTP goes through a single [`HttpActor`](framework::HttpActor) task that owns the
//! `reqwest` client. Everything else holds a cheap, cloneable [`ApiClient`](framework::ApiClient)
//! and talks to the actor over a channel. Each request carries a oneshot reply channel;
//! dropping the caller's future drops the reply channel, and the actor abandons the request.
//!
//! ### Latest wins
//! Lists and dashboard panels load through [`QueryStream`](framework::QueryStream). Starting
//! a load aborts the previous one and bumps a generation counter; a result is only applied
//! if its generation is still current. Out-of-order responses never overwrite newer data.
//!
//! ### Mutate, then refetch
//! There are no optimistic updates. A view validates its form, sends one request and
//! reloads the lists the change affects. A failed submit leaves the dialog open with the
//! server's message.
//!
//! ### Mocking
//! [`MockTransport`](framework::mock::MockTransport) answers requests from an ordered list
//! of expectations, so clients, views and the dispense workflow can be tested without a
//! server. See the [`framework::mock`] module.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Transport ([`framework`])
//! [`ApiClient`](framework::ApiClient), [`ApiError`](framework::ApiError), query building,
//! streams, lists, the keyed cache and blob/object-URL handles.
//!
//! ### 2. The Interface ([`clients`], [`model`])
//! One typed client per backend concern, sharing list/get/create/update through
//! [`CrudResource`](clients::CrudResource). The records are plain `serde` types.
//!
//! ### 3. Input ([`forms`])
//! Form state to request payloads: trimming, number coercion and presence checks.
//!
//! ### 4. Pages ([`views`]) and Dispensing ([`dispense`])
//! Inventory, prescriptions and the stock-alerts dashboard; the dispense queue and session
//! with frequency-based quantity suggestions.
//!
//! ### 5. The Orchestrator ([`lifecycle`], [`config`])
//! [`PharmacySystem`](lifecycle::PharmacySystem) loads nothing by itself: pass it a
//! [`ClientConfig`](config::ClientConfig) from [`load_config`](config::load_config).
//!
//! ## 🚀 Quick Start
//!
//! ```ignore
//! use pharmacy_client::config::load_config;
//! use pharmacy_client::lifecycle::{setup_tracing, PharmacySystem};
//! use pharmacy_client::model::{RxQueueFilter, RxType};
//!
//! setup_tracing();
//! let system = PharmacySystem::connect(load_config()?)?;
//!
//! let queue = system.dispense_queue(RxQueueFilter { location_id: Some(1), ..Default::default() });
//! for entry in queue.refresh().await? {
//!     println!("{} {}", entry.row.id, entry.patient_label);
//! }
//!
//! let mut session = queue.open(41, 1).await?;
//! queue.dispense(&mut session, true, RxType::Opd).await?;
//!
//! drop((queue, session));
//! system.shutdown().await?;
//! ```

pub mod clients;
pub mod config;
pub mod dispense;
pub mod forms;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod views;
