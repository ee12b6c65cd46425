use nalgebra::Vector3;
use radlight::entities::{EntityList, parse_entities};

const MAP: &str = r#"
{
"classname" "worldspawn"
"ambient_night" "0.1 0.2"
}
// a comment between entities
{
"classname" "func_door"
"model" "*2"
"origin" "8 -16 32"
"targetname" "door1"
}
{
"classname" "light"
"light" "250 extra"
"light" "300"
}
"#;

#[test]
fn parses_blocks_in_order() {
    let entities = EntityList::parse(MAP).unwrap();
    assert_eq!(entities.len(), 3);
    assert_eq!(entities.worldspawn().unwrap().classname(), "worldspawn");
    let classes: Vec<&str> = entities.iter().map(|e| e.classname()).collect();
    assert_eq!(classes, ["worldspawn", "func_door", "light"]);
}

#[test]
fn typed_lookups() {
    let entities = EntityList::parse(MAP).unwrap();
    let world = entities.worldspawn().unwrap();
    // missing components are zero
    assert_eq!(world.vector_for_key("ambient_night"), Vector3::new(0.1, 0.2, 0.0));
    assert_eq!(world.float_for_key("nothing"), 0.0);

    // last duplicate wins
    let light = &entities.entities[2];
    assert_eq!(light.float_for_key("light"), 300.0);
    assert_eq!(light.int_for_key("light"), 300);
}

#[test]
fn brush_models_and_targets() {
    let entities = EntityList::parse(MAP).unwrap();
    let door = entities.for_model(2).unwrap();
    assert_eq!(door.model_index(), Some(2));
    assert_eq!(entities.model_origin(2), Vector3::new(8.0, -16.0, 32.0));
    assert_eq!(entities.model_origin(1), Vector3::zeros());
    assert!(entities.for_model(0).is_none());
    assert_eq!(entities.find_target("door1").unwrap().classname(), "func_door");
    assert!(entities.find_target("door2").is_none());
}

#[test]
fn malformed_strings_are_errors() {
    assert!(parse_entities("{ \"classname\" \"light\"").is_err());
    assert!(parse_entities("\"classname\" \"light\" }").is_err());
    assert!(parse_entities("{ \"classname }").is_err());
    assert!(parse_entities("").unwrap().is_empty());
}

#[test]
fn worldspawn_must_come_first() {
    let entities = EntityList::parse("{ \"classname\" \"light\" }\n{ \"classname\" \"worldspawn\" }").unwrap();
    assert!(entities.worldspawn().is_none());
}
