use sapling_dom::host::{memory::MemoryHost, Flag, Host};

#[test]
fn counts_only_effective_mutations() {
	let host = MemoryHost::new();
	let div = host.create_element("div");
	assert_eq!(host.mutation_count(), 0);

	host.set_attribute(&div, "id", "a");
	host.set_attribute(&div, "id", "a");
	host.remove_attribute(&div, "title");
	host.set_flag(&div, Flag::Disabled, false);
	host.set_style(&div, "color", "red");
	host.set_style(&div, "color", "red");
	assert_eq!(host.mutation_count(), 2);
}

#[test]
fn fragments_move_their_children() {
	let host = MemoryHost::new();
	let parent = host.create_element("ul");
	let old = host.create_element("li");
	host.append_child(&parent, &old);

	let fragment = host.create_fragment();
	for text in &["a", "b"] {
		let text = host.create_text(text);
		host.append_child(&fragment, &text);
	}
	host.replace_child(&parent, &fragment, &old);

	assert_eq!(host.inner_html(parent), "ab");
	assert!(host.is_detached(old));
	assert!(host.children(&fragment).is_empty());
}

#[test]
fn parent_skips_non_elements() {
	let host = MemoryHost::new();
	let fragment = host.create_fragment();
	let div = host.create_element("div");
	let text = host.create_text("t");
	host.append_child(&div, &text);

	assert_eq!(host.parent(&text), Some(div));
	assert_eq!(host.parent(&div), None);

	let inner = host.create_text("u");
	host.append_child(&fragment, &inner);
	assert_eq!(host.parent(&inner), None);
}

#[test]
fn markup_is_escaped() {
	let host = MemoryHost::new();
	let p = host.create_element("p");
	let text = host.create_text("1 < 2 & \"x\"");
	host.set_attribute(&p, "title", "say \"hi\"");
	host.append_child(&p, &text);

	assert_eq!(host.outer_html(p), r#"<p title="say &quot;hi&quot;">1 &lt; 2 &amp; "x"</p>"#);
}

#[test]
fn style_attribute_and_map_agree() {
	let host = MemoryHost::new();
	let div = host.create_element("div");

	host.set_attribute(&div, "style", "color: red; margin: 0");
	assert_eq!(host.style(&div, "margin").as_deref(), Some("0"));
	assert_eq!(host.attribute(&div, "style").as_deref(), Some("color: red; margin: 0;"));

	host.remove_attribute(&div, "style");
	assert_eq!(host.style(&div, "color"), None);
}

#[test]
fn removed_subtrees_are_freed() {
	let host = MemoryHost::new();
	let parent = host.create_element("div");
	let child = host.create_element("p");
	let text = host.create_text("gone");
	host.append_child(&child, &text);
	host.append_child(&parent, &child);
	assert_eq!(host.node_count(), 3);

	host.remove_child(&parent, &child);

	assert_eq!(host.node_count(), 1);
	assert!(host.is_detached(child));
	assert!(host.children(&child).is_empty());
	assert_eq!(host.text(&text), None);

	let replacement = host.create_element("span");
	host.append_child(&parent, &replacement);
	host.replace_child(&parent, &host.create_text("new"), &replacement);
	assert_eq!(host.node_count(), 2);
	assert_eq!(host.inner_html(parent), "new");
}
