use xmltree::{Element, XMLNode};

/// Describe la información necesaria para localizar un nodo en el XML de propiedades.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FieldSpec<'a> {
    pub(crate) prefix: Option<&'a str>,
    pub(crate) local_name: &'a str,
    pub(crate) namespace: Option<&'a str>,
}

impl FieldSpec<'_> {
    /// Nombre calificado tal como aparece en los reportes (`dc:creator`, `Company`).
    pub(crate) fn label(&self) -> String {
        match self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.local_name),
            None => self.local_name.to_string(),
        }
    }
}

/// Comprueba si un elemento coincide con la especificación de búsqueda.
pub(crate) fn element_matches(element: &Element, spec: &FieldSpec<'_>) -> bool {
    if element.name != spec.local_name {
        return false;
    }

    match (spec.namespace, element.namespace.as_deref()) {
        (Some(expected), Some(actual)) => expected == actual,
        (Some(_), None) => false,
        (None, _) => true,
    }
}

/// Sustituye el texto de cada elemento que coincida con `spec`, a cualquier profundidad.
///
/// Los valores anteriores de los elementos modificados se agregan a `previous`.
/// No inserta elementos ausentes.
pub(crate) fn replace_matching_text(
    root: &mut Element,
    spec: &FieldSpec<'_>,
    new_value: &str,
    previous: &mut Vec<String>,
) -> bool {
    let mut modified = false;
    for node in root.children.iter_mut() {
        let XMLNode::Element(child) = node else {
            continue;
        };
        if element_matches(child, spec) {
            let old = element_text_content(child);
            if set_element_text(child, new_value) {
                previous.push(old);
                modified = true;
            }
        } else {
            modified |= replace_matching_text(child, spec, new_value, previous);
        }
    }
    modified
}

/// Sustituye el texto de un elemento si difiere del valor actual.
pub(crate) fn set_element_text(element: &mut Element, new_value: &str) -> bool {
    if element_text_content(element) == new_value && !has_cdata(element) {
        return false;
    }

    element
        .children
        .retain(|node| !matches!(node, XMLNode::Text(_) | XMLNode::CData(_)));

    if !new_value.is_empty() {
        element.children.push(XMLNode::Text(new_value.to_string()));
    }

    true
}

fn has_cdata(element: &Element) -> bool {
    element
        .children
        .iter()
        .any(|node| matches!(node, XMLNode::CData(_)))
}

/// Devuelve el texto plano contenido dentro de un elemento.
pub(crate) fn element_text_content(element: &Element) -> String {
    let mut content = String::new();
    for node in &element.children {
        match node {
            XMLNode::Text(text) | XMLNode::CData(text) => content.push_str(text),
            _ => {}
        }
    }
    content.trim().to_string()
}
