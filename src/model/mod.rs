// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Serializable model types: typed ids, node/parameter descriptors, and the
//! ordered graph snapshot.

pub mod descriptor;
pub mod ids;
pub mod snapshot;

pub use descriptor::{
    Bounds, ComponentDescriptor, NodeDescriptor, NodeKind, ParamAccess, ParamDescriptor,
    ParamRole, Pivot, ScriptInfo, SliderInfo, TypeHint,
};
pub use ids::{IdError, InstanceId};
pub use snapshot::Snapshot;
