use rayon::prelude::*;

use crate::build::cache::{CacheMode, LayerCache, hash_chain};
use crate::config::model::{LiveryConfig, SectionConfig};
use crate::foundation::core::BBox;
use crate::foundation::error::{LiveryError, LiveryResult};
use crate::layers::{LayerContext, ResourcePaths, build_layer};
use crate::raster::layer::Layer;
use crate::region::expr::evaluate;
use crate::template::loader::{Template, TemplateLoader};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildThreading {
    /// Build the layers of a section concurrently; folding stays in declared order.
    pub parallel: bool,
    pub threads: Option<usize>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildOpts {
    pub resources: ResourcePaths,
    pub cache: CacheMode,
    pub threading: BuildThreading,
}

impl BuildOpts {
    /// Resource root from the environment, cache off, single-threaded.
    pub fn from_env() -> Self {
        Self {
            resources: ResourcePaths::from_env(),
            ..Self::default()
        }
    }
}

/// Builds a livery: sections are folded in order over the template canvas.
pub struct LiveryBuilder<'a> {
    config: &'a LiveryConfig,
    template: Template,
    opts: BuildOpts,
}

impl<'a> LiveryBuilder<'a> {
    /// Validates `config` and loads its template.
    pub fn new(
        config: &'a LiveryConfig,
        loader: &dyn TemplateLoader,
        opts: BuildOpts,
    ) -> LiveryResult<Self> {
        config.validate()?;
        let template = loader.load(&config.template)?;
        Ok(Self {
            config,
            template,
            opts,
        })
    }

    pub fn with_template(
        config: &'a LiveryConfig,
        template: Template,
        opts: BuildOpts,
    ) -> LiveryResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            template,
            opts,
        })
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    #[tracing::instrument(skip(self), fields(template = %self.template.name, size = %self.template.size))]
    pub fn build(&self) -> LiveryResult<Layer> {
        let size = self.template.size;
        let sections = &self.config.sections;
        let pool = if self.opts.threading.parallel {
            Some(build_thread_pool(self.opts.threading.threads)?)
        } else {
            None
        };

        let cache = match &self.opts.cache {
            CacheMode::Disabled => None,
            CacheMode::Enabled { dir } => Some(LayerCache::new(dir)),
        };
        let chain = match &cache {
            Some(_) => hash_chain(&self.template.content_hash, sections)?,
            None => Vec::new(),
        };

        let (mut livery, start) = match &cache {
            Some(c) => match c.latest(&chain, size)? {
                Some((done, layer)) => {
                    tracing::info!("resuming after cached section {done}/{}", sections.len());
                    (layer, done)
                }
                None => (Layer::empty(size), 0),
            },
            None => (Layer::empty(size), 0),
        };

        for (i, section) in sections.iter().enumerate().skip(start) {
            tracing::info!("SECTION [{}/{}]", i + 1, sections.len());
            let (built, origin) = self.build_section(section, pool.as_ref())?;
            livery = livery.flatten(&built, origin);
            if let Some(c) = &cache {
                c.store(&chain[i + 1], &livery)?;
            }
        }

        if let Some(expr) = &self.config.final_mask {
            let selection = evaluate(expr, &self.template.regions)?;
            livery = livery.mask(&selection.mask, false)?;
        }
        if let Some(b) = &self.config.brighten_by_spec {
            livery = livery.brighten_by_spec(b.a, b.b);
        }
        Ok(livery)
    }

    /// Returns the clipped section raster and its canvas origin.
    fn build_section(
        &self,
        section: &SectionConfig,
        pool: Option<&rayon::ThreadPool>,
    ) -> LiveryResult<(Layer, (i64, i64))> {
        let selection = match &section.section {
            Some(expr) => Some(evaluate(expr, &self.template.regions)?),
            None => None,
        };
        let bbox = selection
            .as_ref()
            .map_or(BBox::full(self.template.size), |s| s.bbox);
        let ctx = LayerContext {
            size: bbox.size(),
            origin: bbox.origin(),
            resources: &self.opts.resources,
            template_dir: self.template.dir.as_deref(),
        };

        let total = section.layers.len();
        let mut acc = Layer::empty(ctx.size);
        match pool {
            Some(pool) => {
                let layers = pool.install(|| {
                    section
                        .layers
                        .par_iter()
                        .map(|spec| build_layer(spec, &ctx))
                        .collect::<LiveryResult<Vec<_>>>()
                })?;
                for layer in &layers {
                    acc = acc.flatten(layer, (0, 0));
                }
            }
            None => {
                for (j, spec) in section.layers.iter().enumerate() {
                    tracing::info!("  LAYER [{}/{}] {}", j + 1, total, spec.kind());
                    acc = acc.flatten(&build_layer(spec, &ctx)?, (0, 0));
                }
            }
        }

        if let Some(selection) = selection {
            let clip = selection.mask.crop(bbox)?;
            acc = acc.mask(&clip, false)?;
        }
        Ok((acc, bbox.origin()))
    }
}

/// Loads the template, builds every section and applies the finishing passes.
pub fn build_livery(
    config: &LiveryConfig,
    loader: &dyn TemplateLoader,
    opts: BuildOpts,
) -> LiveryResult<Layer> {
    LiveryBuilder::new(config, loader, opts)?.build()
}

fn build_thread_pool(threads: Option<usize>) -> LiveryResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LiveryError::validation(
            "build threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LiveryError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/build/pipeline.rs"]
mod tests;
