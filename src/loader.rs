//! Scene asset loading: glTF/GLB bytes to a [`SceneGraph`].
//!
//! Only what the game needs is extracted: node names, local transforms and
//! mesh bounds (from the POSITION accessor min/max). Vertex data is not read.

use glam::{Mat4, Vec3};
use thiserror::Error;
use tracing::{debug, info};

use crate::model::{Aabb, NodeId, SceneGraph};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read asset: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("failed to fetch asset: {0}")]
    Fetch(String),
    #[error("asset has no scene")]
    NoScene,
    #[error("scene has no node named `{0}`")]
    MissingNode(String),
}

/// Parse a `.glb` or `.gltf` document into a scene graph
pub fn parse_scene(bytes: &[u8]) -> Result<SceneGraph, LoadError> {
    let gltf = gltf::Gltf::from_slice(bytes)?;
    let document = &gltf.document;
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(LoadError::NoScene)?;

    let mut graph = SceneGraph::new();
    for node in scene.nodes() {
        add_node(&mut graph, None, &node);
    }

    info!(nodes = graph.len(), "scene parsed");
    Ok(graph)
}

fn add_node(graph: &mut SceneGraph, parent: Option<NodeId>, node: &gltf::Node) {
    let name = node.name().unwrap_or_default();
    let transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let geometry = node.mesh().and_then(|mesh| mesh_bounds(&mesh));
    debug!(name, has_geometry = geometry.is_some(), "node");

    let id = graph.add_node(parent, name, transform, geometry);
    for child in node.children() {
        add_node(graph, Some(id), &child);
    }
}

/// Union of the primitive bounding boxes
fn mesh_bounds(mesh: &gltf::Mesh) -> Option<Aabb> {
    mesh.primitives()
        .map(|prim| {
            let b = prim.bounding_box();
            Aabb::new(Vec3::from_array(b.min), Vec3::from_array(b.max))
        })
        .reduce(|a, b| a.union(&b))
}

/// Read and parse the asset from disk
#[cfg(not(target_arch = "wasm32"))]
pub async fn load_scene(path: &str) -> Result<SceneGraph, LoadError> {
    info!(path, "loading scene");
    let bytes = std::fs::read(path)?;
    parse_scene(&bytes)
}

/// Fetch the asset over HTTP and parse it
#[cfg(target_arch = "wasm32")]
pub async fn load_scene(url: &str) -> Result<SceneGraph, LoadError> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    info!(url, "loading scene");
    let fetch_err = |e: wasm_bindgen::JsValue| LoadError::Fetch(format!("{e:?}"));

    let window = web_sys::window().ok_or_else(|| LoadError::Fetch("no global `window`".into()))?;
    let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(fetch_err)?
        .dyn_into()
        .map_err(fetch_err)?;
    if !response.ok() {
        return Err(LoadError::Fetch(format!("HTTP {} for {url}", response.status())));
    }

    let buffer = JsFuture::from(response.array_buffer().map_err(fetch_err)?)
        .await
        .map_err(fetch_err)?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    parse_scene(&bytes)
}
