// Copyright (c) 2026 PlanGuard Contributors
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Compiler and runtime-parameter-binding errors. A compiler failure on a
//! plan that already passed validation is either a bug in this crate or a
//! dialect profile that incorrectly claimed support for something its
//! `SQLCompiler` can't actually render.

use serde_json::{json, Value};
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompilationError>;

#[derive(Debug, Clone, Error)]
pub enum CompilationError {
    #[error("target '{target}' does not support {feature}")]
    Unsupported { target: String, feature: String },

    #[error("internal compiler error: {message}")]
    Internal { message: String },

    #[error("no compiler registered for target '{target}'")]
    UnknownTarget { target: String },

    #[error("required runtime parameter '{name}' was not supplied")]
    MissingRuntimeParam { name: String },

    #[error("runtime parameter '{name}' collides with a compiler-bound parameter")]
    RuntimeParamCollision { name: String },
}

impl CompilationError {
    pub fn code(&self) -> &'static str {
        match self {
            CompilationError::Unsupported { .. } => "compile.unsupported_feature",
            CompilationError::Internal { .. } => "compile.internal",
            CompilationError::UnknownTarget { .. } => "compile.unknown_target",
            CompilationError::MissingRuntimeParam { .. } => "runtime.missing_param",
            CompilationError::RuntimeParamCollision { .. } => "runtime.param_collision",
        }
    }

    pub fn details(&self) -> Value {
        match self {
            CompilationError::Unsupported { target, feature } => {
                json!({ "target": target, "feature": feature })
            }
            CompilationError::Internal { message } => json!({ "message": message }),
            CompilationError::UnknownTarget { target } => json!({ "target": target }),
            CompilationError::MissingRuntimeParam { name } => json!({ "name": name }),
            CompilationError::RuntimeParamCollision { name } => json!({ "name": name }),
        }
    }
}
