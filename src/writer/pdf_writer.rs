//! PDF document compiler.
//!
//! Runs every pass over a [`Document`] in order and assembles the object
//! graph: fonts, alpha states, images, optional content, then each page
//! with its content stream, gradient patterns and link annotations, and
//! finally the pages tree, catalog and information dictionary. Nothing is
//! numbered until [`ObjectGraph::write_to`] walks the finished graph.

use super::annotation_builder::LinkResolver;
use super::bounds::{tagged_bounds, TaggedBoundsTable};
use super::content_stream::{
    alpha_name, composite_font_name, generate_page, group_name, image_name, pattern_name,
    simple_font_name, soft_mask_name, CodegenContext, PageContent,
};
use super::discovery::{discover, DiscoveredResources};
use super::filters::flatten_document;
use super::font_embedder::{EmbeddedFamily, FontEmbedder};
use super::graphics_state::add_alpha_states;
use super::image_handler::add_images;
use super::layers::OptionalContent;
use super::object_graph::ObjectGraph;
use super::shading::{ShadingSynthesizer, SynthesizedGradient};
use crate::config::CompileOptions;
use crate::elements::{Document, Page};
use crate::error::{Error, Result};
use crate::object::{Dict, Object, ObjectId, Stream};
use indexmap::IndexSet;
use std::io::Write;

/// Document-wide objects every page refers to.
struct SharedResources {
    resources: DiscoveredResources,
    fonts: Vec<EmbeddedFamily>,
    alpha_states: Vec<ObjectId>,
    images: Vec<ObjectId>,
    layers: OptionalContent,
}

/// Compiles documents with a fixed set of options.
#[derive(Debug, Clone, Default)]
pub struct PdfCompiler {
    options: CompileOptions,
}

impl PdfCompiler {
    /// Create a compiler.
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile into an in-memory buffer.
    pub fn compile(&self, document: &Document) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.compile_to(document, &mut out)?;
        Ok(out)
    }

    /// Compile into a sink.
    ///
    /// The sink receives nothing unless the whole graph was built and
    /// validated.
    pub fn compile_to<W: Write>(&self, document: &Document, w: W) -> Result<()> {
        let graph = self.build_graph(document)?;
        graph.write_to(&self.options.version, w)
    }

    /// Run every pass and return the unnumbered object graph.
    pub fn build_graph(&self, document: &Document) -> Result<ObjectGraph> {
        let opts = &self.options;
        let document =
            flatten_document(document, opts.filter_policy, opts.rasterizer.as_deref())?;

        let mut graph = ObjectGraph::new();
        let shared = self.add_shared_resources(&mut graph, &document)?;

        let pages_id = graph.reserve();
        let page_ids = document.pages.iter().map(|_| graph.reserve()).collect::<Vec<_>>();

        let tables = document
            .pages
            .iter()
            .enumerate()
            .map(|(index, page)| tagged_bounds(page, index))
            .collect::<Result<Vec<TaggedBoundsTable>>>()?;
        let links = LinkResolver::new(&opts.link_destinations, &tables, &shared.layers);

        let ctx = CodegenContext {
            resources: &shared.resources,
            fonts: &shared.fonts,
            text_mode: opts.text_mode,
        };
        for (index, page) in document.pages.iter().enumerate() {
            let content = generate_page(page, index, &ctx)?;
            let contents_id = graph.add(Stream::with_compression(
                Dict::new(),
                &content.content,
                opts.compress,
            )?);
            let gradients =
                ShadingSynthesizer::new(&mut graph, opts.compress).synthesize(&content.gradients)?;
            let resources = build_resources(&shared, &content, &gradients)?;

            let mut annots = Vec::new();
            for link in links.page_links(&tables[index]) {
                annots.push(Object::Reference(graph.add(link.build(&page_ids)?)));
            }

            graph.fill(
                page_ids[index],
                build_page_dict(page, pages_id, resources, contents_id, annots),
            )?;
        }

        graph.fill(
            pages_id,
            Object::dict(vec![
                ("Type", Object::name("Pages")),
                (
                    "Kids",
                    Object::Array(page_ids.iter().map(|id| Object::Reference(*id)).collect()),
                ),
                ("Count", Object::Integer(page_ids.len() as i64)),
            ]),
        )?;

        let mut catalog = Dict::new();
        catalog.insert("Type".to_string(), Object::name("Catalog"));
        catalog.insert("Pages".to_string(), Object::Reference(pages_id));
        if let Some(properties) = shared.layers.build_oc_properties() {
            catalog.insert("OCProperties".to_string(), properties);
        }
        let catalog_id = graph.add(catalog);
        graph.set_root(catalog_id)?;

        if !opts.info.is_empty() {
            let info = opts
                .info
                .entries()
                .into_iter()
                .map(|(key, value)| (key, Object::string(value)))
                .collect::<Vec<_>>();
            let info_id = graph.add(Object::dict(info));
            graph.set_info(info_id);
        }

        log::debug!(
            "Compiled {} page(s) into {} object(s)",
            document.pages.len(),
            graph.len()
        );
        Ok(graph)
    }

    fn add_shared_resources(
        &self,
        graph: &mut ObjectGraph,
        document: &Document,
    ) -> Result<SharedResources> {
        let opts = &self.options;
        let resources = discover(document, opts.text_mode);
        let fonts = FontEmbedder::new(graph, opts.compress).embed_all(&resources)?;
        let alpha_states = add_alpha_states(graph, &resources.alphas);
        let images = add_images(
            graph,
            resources.images.values().map(|image| image.as_ref()),
            opts.compress,
        )?;
        for hidden in &opts.hidden_layers {
            if !resources.layers.contains(hidden) {
                log::warn!("Hidden layer '{}' is never used", hidden);
            }
        }
        let layers = OptionalContent::build(
            graph,
            &resources.layers,
            resources.groups.values(),
            &opts.hidden_layers,
        )?;
        Ok(SharedResources {
            resources,
            fonts,
            alpha_states,
            images,
            layers,
        })
    }
}

fn lookup(ids: &[ObjectId], index: usize, what: &str) -> Result<Object> {
    ids.get(index)
        .map(|id| Object::Reference(*id))
        .ok_or_else(|| Error::ResourceLookup(format!("{} {} has no object", what, index)))
}

/// Entries of `used` in discovery order.
fn in_order(used: &IndexSet<usize>) -> Vec<usize> {
    let mut indices = used.iter().copied().collect::<Vec<_>>();
    indices.sort_unstable();
    indices
}

/// Build the page's resource dictionary from what its content uses.
fn build_resources(
    shared: &SharedResources,
    content: &PageContent,
    gradients: &[SynthesizedGradient],
) -> Result<Dict> {
    let used = &content.used;

    let mut ext_gstates = Dict::new();
    for i in in_order(&used.alphas) {
        ext_gstates.insert(alpha_name(i), lookup(&shared.alpha_states, i, "alpha state")?);
    }
    for (i, gradient) in gradients.iter().enumerate() {
        if let Some(mask) = gradient.soft_mask {
            ext_gstates.insert(soft_mask_name(i), Object::Reference(mask));
        }
    }

    let mut fonts = Dict::new();
    let font_of = |i: usize, pick: fn(&EmbeddedFamily) -> Option<ObjectId>, what: &str| {
        shared
            .fonts
            .get(i)
            .and_then(pick)
            .map(Object::Reference)
            .ok_or_else(|| Error::ResourceLookup(format!("{} {} has no object", what, i)))
    };
    for i in in_order(&used.simple_fonts) {
        fonts.insert(simple_font_name(i), font_of(i, |f| f.simple, "simple font")?);
    }
    for i in in_order(&used.composite_fonts) {
        fonts.insert(composite_font_name(i), font_of(i, |f| f.composite, "composite font")?);
    }

    let mut xobjects = Dict::new();
    for i in in_order(&used.images) {
        xobjects.insert(image_name(i), lookup(&shared.images, i, "image")?);
    }

    let patterns = gradients
        .iter()
        .enumerate()
        .map(|(i, g)| (pattern_name(i), Object::Reference(g.pattern)))
        .collect::<Dict>();

    let mut properties = Dict::new();
    for i in in_order(&used.groups) {
        properties.insert(group_name(i), lookup(shared.layers.groups(), i, "layer group")?);
    }

    let mut resources = Dict::new();
    for (key, entries) in [
        ("ExtGState", ext_gstates),
        ("Font", fonts),
        ("XObject", xobjects),
        ("Pattern", patterns),
        ("Properties", properties),
    ] {
        if !entries.is_empty() {
            resources.insert(key.to_string(), Object::Dictionary(entries));
        }
    }
    Ok(resources)
}

fn build_page_dict(
    page: &Page,
    parent: ObjectId,
    resources: Dict,
    contents: ObjectId,
    annots: Vec<Object>,
) -> Dict {
    let mut dict = Dict::new();
    dict.insert("Type".to_string(), Object::name("Page"));
    dict.insert("Parent".to_string(), Object::Reference(parent));
    dict.insert("MediaBox".to_string(), Object::reals(&[0.0, 0.0, page.width, page.height]));
    dict.insert("Resources".to_string(), Object::Dictionary(resources));
    dict.insert("Contents".to_string(), Object::Reference(contents));
    if !annots.is_empty() {
        dict.insert("Annots".to_string(), Object::Array(annots));
    }
    dict
}

/// Compile a document into an in-memory buffer.
///
/// ```
/// use scene_pdf::config::CompileOptions;
/// use scene_pdf::elements::{Document, Page};
///
/// let mut doc = Document::new();
/// doc.push(Page::new(612.0, 792.0));
/// let bytes = scene_pdf::compile(&doc, &CompileOptions::default()).unwrap();
/// assert!(bytes.starts_with(b"%PDF-1.7\n"));
/// ```
pub fn compile(document: &Document, options: &CompileOptions) -> Result<Vec<u8>> {
    PdfCompiler::new(options.clone()).compile(document)
}

/// Compile a document into a sink.
pub fn compile_to<W: Write>(document: &Document, options: &CompileOptions, w: W) -> Result<()> {
    PdfCompiler::new(options.clone()).compile_to(document, w)
}
