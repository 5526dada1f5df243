// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod animation;
pub mod forms;
pub mod ids;
pub mod model;
pub mod navbar;
pub mod route;
pub mod session;
pub mod state;

pub use animation::*;
pub use forms::*;
pub use ids::*;
pub use model::*;
pub use navbar::*;
pub use route::*;
pub use session::*;
pub use state::*;
