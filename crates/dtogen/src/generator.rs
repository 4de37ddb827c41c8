// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Generation entry point.
//!
//! [`Generator::run`] drives the whole pipeline: read the model from the
//! source roots, collect a member plan per entity, emit one DTO file per
//! entity and one conversion service file, re-parse every emitted stream as
//! a safety gate, format with `prettyplease` and write the files plus a
//! `mod.rs` index under the output directory.

use std::{collections::HashSet, fs, path::PathBuf};

use proc_macro2::TokenStream;
use quote::quote;
use tracing::debug;

use crate::{
    collect::{EntityPlan, RunStats, collect_entity},
    config::GeneratorConfig,
    emit::{
        converter::emit_converter,
        dto::{DtoShape, emit_dto},
    },
    error::GeneratorError,
    model::SourceModel,
    names,
};

const FILE_HEADER: &str = "//! Generated by dtogen. Do not edit.\n\n";
const SERVICE_MODULE: &str = "dto_conversion_service";
const SERVICE_TYPE: &str = "DtoConversionService";

/// Source-to-source generator, configured once and run per build.
pub struct Generator {
    config: GeneratorConfig,
}

/// What one [`Generator::run`] produced.
#[derive(Debug)]
pub struct GenerationReport {
    /// Every file written, in writing order.
    pub written: Vec<PathBuf>,
    /// Entities that produced a DTO.
    pub entities: usize,
    /// Members dropped with a diagnostic instead of failing the run.
    pub skipped_members: usize,
    /// Query methods declared on entities, parsed as schema only.
    pub query_methods: usize,
}

impl Generator {
    /// Creates a generator over a finished configuration.
    #[must_use]
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Runs generation end to end.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError`] on structural failures: unreadable or
    /// unparseable sources, duplicate type or DTO names, or an output
    /// directory that cannot be written. Per-member problems are logged
    /// and counted in the report instead.
    pub fn run(&self) -> Result<GenerationReport, GeneratorError> {
        let config = &self.config;
        let model = SourceModel::read(config.source_roots())?;

        let mut stats = RunStats::default();
        let mut files: Vec<(String, TokenStream)> = Vec::new();
        let mut index: Vec<(String, String)> = Vec::new();
        let mut dto_names: HashSet<String> = HashSet::new();
        let mut plans: Vec<(EntityPlan<'_>, DtoShape)> = Vec::new();

        for entity in model.entities(config.base_module.as_deref()) {
            debug!(entity = %entity.qualified_name(), "collecting");
            let plan = collect_entity(&model, entity, config, &mut stats);
            let (tokens, shape) = emit_dto(&model, config, &plan, &mut stats);

            let dto_name = shape.ident.to_string();
            if !dto_names.insert(dto_name.clone()) {
                return Err(GeneratorError::DuplicateType { name: dto_name });
            }
            let stem = names::module_file_stem(&dto_name);
            files.push((stem.clone(), tokens));
            index.push((stem, dto_name));
            plans.push((plan, shape));
        }

        let service = emit_converter(&model, config, &plans, &mut stats);
        files.push((SERVICE_MODULE.to_owned(), service));
        index.push((SERVICE_MODULE.to_owned(), SERVICE_TYPE.to_owned()));

        index.sort();
        files.push(("mod".to_owned(), index_tokens(&index)));

        let output_dir = config.output_dir();
        fs::create_dir_all(output_dir).map_err(|source| GeneratorError::io(output_dir, source))?;

        let mut written = Vec::with_capacity(files.len());
        for (stem, tokens) in files {
            let file = syn::parse2::<syn::File>(tokens)
                .map_err(|source| GeneratorError::InvalidOutput { name: stem.clone(), source })?;
            let path = output_dir.join(format!("{stem}.rs"));
            let body = format!("{FILE_HEADER}{}", prettyplease::unparse(&file));
            fs::write(&path, body).map_err(|source| GeneratorError::io(&path, source))?;
            debug!(path = %path.display(), "written");
            written.push(path);
        }

        Ok(GenerationReport {
            written,
            entities: dto_names.len(),
            skipped_members: stats.skipped_members,
            query_methods: model.declared_queries(),
        })
    }
}

/// The `mod.rs` index: module declarations plus flat re-exports, so sibling
/// files and downstream code reference every generated item one level below
/// the configured DTO path.
fn index_tokens(entries: &[(String, String)]) -> TokenStream {
    let mods = entries.iter().map(|(stem, _)| {
        let module = names::ident(stem);
        quote! { mod #module; }
    });
    let uses = entries.iter().map(|(stem, item)| {
        let module = names::ident(stem);
        let item = names::ident(item);
        quote! { pub use self::#module::#item; }
    });
    quote! {
        #(#mods)*
        #(#uses)*
    }
}
