use sapling_dom::{
	create_node,
	normalize::{normalize, normalize_children, Element, Node},
	Component, Handler, PropValue, Props, VNode,
};

fn text(text: &str) -> Node {
	Node::Text(text.to_owned())
}

#[test]
fn flattens_lists_and_drops_noise() {
	let input = VNode::List(vec![
		1.into(),
		VNode::List(vec![2.into(), VNode::List(vec![false.into(), 3.into(), VNode::Null])]),
		4.into(),
	]);

	assert_eq!(normalize(&input), Node::Fragment(vec![text("1"), text("2"), text("3"), text("4")]));
}

#[test]
fn leaves() {
	assert_eq!(normalize(&VNode::Null), Node::Empty);
	assert_eq!(normalize(&VNode::Bool(true)), Node::Empty);
	assert_eq!(normalize(&VNode::Bool(false)), Node::Empty);
	assert_eq!(normalize(&VNode::text("")), Node::Empty);
	assert_eq!(normalize(&VNode::text("hello")), text("hello"));
	assert_eq!(normalize(&VNode::Number(1.5)), text("1.5"));
	assert_eq!(normalize(&42.into()), text("42"));
}

#[test]
fn numbers_are_written_like_script_numbers() {
	let cases = [
		(f64::NAN, "NaN"),
		(f64::INFINITY, "Infinity"),
		(f64::NEG_INFINITY, "-Infinity"),
		(-0.0, "0"),
		(0.1 + 0.2, "0.30000000000000004"),
		(1e20, "100000000000000000000"),
		(1e21, "1e+21"),
		(-2.5e30, "-2.5e+30"),
		(0.000_001, "0.000001"),
		(1e-7, "1e-7"),
		(1.5e-7, "1.5e-7"),
	];
	for &(number, expected) in &cases {
		assert_eq!(normalize(&VNode::Number(number)), text(expected), "{}", expected);
		assert_eq!(PropValue::Number(number).to_attribute().as_deref(), Some(expected));
	}
}

#[test]
fn element_children_are_filtered() {
	let input = create_node(
		"ul",
		Props::new().with("id", "list"),
		vec![VNode::Null, false.into(), true.into(), "".into(), "x".into(), VNode::List(vec![VNode::text("y")])],
	);

	assert_eq!(
		normalize(&input),
		Node::Element(Element {
			tag: "ul".to_owned(),
			props: Props::new().with("id", "list"),
			children: vec![text("x"), text("y")],
		})
	);
}

#[test]
fn children_prop_is_dropped() {
	let input = create_node("div", Props::new().with("children", PropValue::Children(vec![VNode::text("stale")])).with("id", "a"), vec![]);

	match normalize(&input) {
		Node::Element(element) => {
			assert_eq!(element.props, Props::new().with("id", "a"));
			assert!(element.children.is_empty());
		}
		other => panic!("Expected an element, found {:?}", other),
	}
}

fn card() -> Component {
	Component::new("Card", |props| {
		let title = match props.get("title") {
			Some(PropValue::Str(title)) => title.clone(),
			_ => "untitled".to_owned(),
		};
		create_node(
			"section",
			Props::new().with("className", "card"),
			vec![create_node("h2", Props::new(), vec![VNode::Text(title)]), VNode::List(props.children().to_vec())],
		)
	})
}

#[test]
fn component_expands_like_a_direct_call() {
	let card = card();
	let children = vec![create_node("p", Props::new(), vec![VNode::text("A")]), "B".into()];
	let node = create_node(card.clone(), Props::new().with("title", "Hi"), children.clone());

	let direct = card.render(&Props::new().with("title", "Hi").with("children", PropValue::Children(children)));

	assert_eq!(normalize(&node), normalize(&direct));
}

#[test]
fn component_result_is_spliced_into_parent() {
	let pair = Component::new("Pair", |_| VNode::List(vec!["left".into(), VNode::Null, "right".into()]));
	let input = create_node("div", Props::new(), vec![create_node(pair, Props::new(), vec![]), "end".into()]);

	match normalize(&input) {
		Node::Element(element) => assert_eq!(element.children, vec![text("left"), text("right"), text("end")]),
		other => panic!("Expected an element, found {:?}", other),
	}
}

#[test]
fn nested_components_resolve_fully() {
	let inner = Component::new("Inner", |props| create_node("em", Props::new(), props.children().to_vec()));
	let outer = {
		let inner = inner.clone();
		Component::new("Outer", move |props| create_node(inner.clone(), Props::new(), props.children().to_vec()))
	};

	assert_eq!(
		normalize(&create_node(outer, Props::new(), vec![VNode::text("deep")])),
		Node::Element(Element {
			tag: "em".to_owned(),
			props: Props::new(),
			children: vec![text("deep")],
		})
	);
}

#[test]
fn component_rendering_nothing_is_empty() {
	let nothing = Component::new("Nothing", |_| VNode::Null);
	assert_eq!(normalize(&create_node(nothing.clone(), Props::new(), vec![])), Node::Empty);
	assert!(normalize_children(&[create_node(nothing, Props::new(), vec![])]).is_empty());
}

#[test]
fn idempotent() {
	let handler = Handler::new(|_| ());
	let samples = vec![
		VNode::Null,
		VNode::Bool(true),
		"text".into(),
		7.into(),
		VNode::List(vec![VNode::List(vec!["a".into(), VNode::Null]), 1.into()]),
		create_node(
			"form",
			Props::new().on("submit", handler).with("className", "f").with("style", PropValue::style(vec![("color", "red")])),
			vec![
				create_node("input", Props::new().with("checked", true), vec![]),
				create_node(card(), Props::new(), vec![VNode::text("child")]),
				VNode::List(vec![false.into(), "tail".into()]),
			],
		),
	];

	for sample in &samples {
		let once = normalize(sample);
		assert_eq!(normalize(&once.to_vnode()), once, "Not a fixed point: {:?}", sample);
	}
}

#[test]
fn components_compare_by_identity() {
	let a = Component::new("Same", |_| VNode::Null);
	let b = Component::new("Same", |_| VNode::Null);
	assert_eq!(a, a.clone());
	assert_ne!(a, b);
}

#[test]
fn factory_flattens_and_drops_absent_children() {
	match create_node("p", Props::new(), vec![VNode::List(vec![VNode::Null, "a".into(), VNode::List(vec![false.into(), true.into()])]), 0.into()]) {
		VNode::Element(element) => assert_eq!(element.children, vec![VNode::text("a"), VNode::Bool(true), VNode::Number(0.0)]),
		other => panic!("Expected an element, found {:?}", other),
	}
}
