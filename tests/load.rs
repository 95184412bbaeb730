use sapling_dom::{
	host::{memory::MemoryHost, Host},
	load::{load_child_nodes, load_node},
	normalize::{Element, Node},
	PropValue, Props,
};

#[test]
fn loads_markup_as_props() {
	let host = MemoryHost::new();
	let input = host.create_element("INPUT");
	host.set_attribute(&input, "class", "wide");
	host.set_attribute(&input, "type", "checkbox");
	host.set_attribute(&input, "readonly", "");
	host.set_attribute(&input, "style", "color: red");

	assert_eq!(
		load_node(&host, &input),
		Node::Element(Element {
			tag: "input".to_owned(),
			props: Props::new()
				.with("className", "wide")
				.with("type", "checkbox")
				.with("readOnly", true)
				.with("style", PropValue::Str("color: red;".to_owned())),
			children: vec![],
		})
	);
}

#[test]
fn keeps_positions_of_empty_text() {
	let host = MemoryHost::new();
	let parent = host.create_element("div");
	for node in &[host.create_text("a"), host.create_text(""), host.create_element("br")] {
		host.append_child(&parent, node);
	}

	assert_eq!(
		load_child_nodes(&host, &parent),
		vec![
			Node::Text("a".to_owned()),
			Node::Empty,
			Node::Element(Element {
				tag: "br".to_owned(),
				props: Props::new(),
				children: vec![],
			}),
		]
	);
}
