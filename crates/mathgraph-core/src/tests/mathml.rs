use super::goat;
use crate::*;

#[test]
fn mathml_goat_loads_the_content_tree() {
    let t = goat();
    assert_eq!(t.id, "c1");
    assert_eq!(t.name, "apply");
    assert_eq!(t.xref.as_deref(), Some("p1"));
    assert_eq!(t.node_count(), 20);
    assert_eq!(t.iter().filter(|n| n.is_apply()).count(), 7);
    assert_eq!(t.find("c14").and_then(|n| n.text.as_deref()), Some("π"));
    assert_eq!(t.find("c2").map(|n| n.text.is_none()), Some(true));
}

#[test]
fn mathml_generates_path_ids_for_elements_without_ids() {
    let t = parse_mathml(
        r#"<math><apply><plus/><ci id="x">x</ci><apply><times/><cn>2</cn></apply></apply></math>"#,
    )
    .unwrap();
    let ids: Vec<&str> = t.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["n", "n.0", "x", "n.2", "n.2.0", "n.2.1"]);
}

#[test]
fn mathml_path_ids_are_stable_across_loads() {
    let xml = "<apply><minus/><ci>a</ci><ci>b</ci></apply>";
    assert_eq!(parse_mathml(xml).unwrap(), parse_mathml(xml).unwrap());
}

#[test]
fn mathml_reads_xml_id_and_trims_text() {
    let t = parse_mathml(r#"<ci xml:id="v">
        alpha
    </ci>"#)
    .unwrap();
    assert_eq!(t.id, "v");
    assert_eq!(t.text.as_deref(), Some("alpha"));
}

#[test]
fn mathml_falls_back_to_the_first_semantics_child() {
    let t = parse_mathml("<math><semantics><ci>y</ci><annotation>y</annotation></semantics></math>")
        .unwrap();
    assert_eq!(t.name, "ci");
    assert_eq!(t.text.as_deref(), Some("y"));
}

#[test]
fn mathml_rejects_empty_documents_and_duplicate_ids() {
    assert!(matches!(
        parse_mathml("<math/>").unwrap_err(),
        Error::EmptyDocument
    ));
    assert!(matches!(
        parse_mathml(r#"<apply id="a"><plus id="a"/></apply>"#).unwrap_err(),
        Error::DuplicateNodeId { .. }
    ));
    assert!(matches!(
        parse_mathml("<apply><plus/>").unwrap_err(),
        Error::Xml(_)
    ));
}
