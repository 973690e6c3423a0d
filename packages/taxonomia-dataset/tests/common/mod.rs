//! Shared fixtures for the integration tests
//!
//! Character tree of `FLORA_DOCUMENT`:
//!
//! ```text
//! c0
//! ├── c1 Leaf shape      s1 ovate, s2 linear
//! ├── c2 Flower colour   s3 white, s4 yellow
//! │   └── c3 Petal count s5 four, s6 five (requires s3)
//! └── c4 Fruit           (no states)
//! ```
//!
//! Taxon tree: t1 Rosaceae holding t2 Rosa canina and t3 Prunus spinosa,
//! t4 Oryza sativa at the top.

#![allow(dead_code)]

use taxonomia_dataset::codec;
use taxonomia_dataset::Dataset;

pub const FLORA_DOCUMENT: &str = r##"{
  "id": "flora",
  "characters": [
    { "id": "c1", "name": "Leaf shape", "nameEN": "Leaf shape", "nameCN": "叶形",
      "photos": [ { "id": "cp1", "url": "http://pics.example/leaf.jpg", "label": "leaf" } ],
      "states": [ "s1", "s2" ] },
    { "id": "c2", "name": "Flower colour", "children": [ "c3" ], "states": [ "s3", "s4" ] },
    { "id": "c3", "parentId": "c2", "name": "Petal count", "states": [ "s5", "s6" ],
      "requiredStatesIds": [ "s3" ] },
    { "id": "c4", "name": "Fruit" }
  ],
  "states": [
    { "id": "s1", "name": "ovate", "nameEN": "egg-shaped",
      "photos": [ { "id": "p1", "url": "http://pics.example/ovate.jpg", "label": "ovate leaf" },
                  { "id": "p2", "url": "http://pics.example/ovate-2.jpg", "label": "" } ] },
    { "id": "s2", "name": "linear" },
    { "id": "s3", "name": "white", "color": "#ffffff" },
    { "id": "s4", "name": "yellow", "nameCN": "黄色", "color": "#ffff00" },
    { "id": "s5", "name": "four" },
    { "id": "s6", "name": "five",
      "photos": [ { "id": "p3", "url": "http://pics.example/ovate.jpg", "label": "shared" } ] }
  ],
  "taxons": [
    { "id": "t1", "name": "Rosaceae", "children": [ "t2", "t3" ] },
    { "id": "t2", "parentId": "t1", "name": "Rosa canina", "vernacularName": "dog rose",
      "author": "L.", "website": "http://roses.example",
      "descriptions": [
        { "descriptorId": "c1", "statesIds": [ "s1" ] },
        { "descriptorId": "c2", "statesIds": [ "s3" ] },
        { "descriptorId": "c3", "statesIds": [ "s5" ] }
      ],
      "bookInfobyids": { "b1": { "fasc": "2", "page": "118", "detail": "plate 4" } },
      "extra": { "altitude": 1200, "native": true } },
    { "id": "t3", "parentId": "t1", "name": "Prunus spinosa", "author": "L.",
      "descriptions": [
        { "descriptorId": "c1", "statesIds": [ "s1" ] },
        { "descriptorId": "c2", "statesIds": [ "s3" ] },
        { "descriptorId": "c3", "statesIds": [ "s6" ] }
      ] },
    { "id": "t4", "name": "Oryza sativa",
      "descriptions": [
        { "descriptorId": "c1", "statesIds": [ "s2" ] },
        { "descriptorId": "c2", "statesIds": [ "s4" ] }
      ] }
  ],
  "books": [ { "id": "b1", "label": "Flora of the Hills" } ],
  "extraFields": [ { "std": false, "id": "altitude", "label": "Altitude", "icon": "" } ],
  "dictionaryEntries": {
    "3": { "id": 3, "nameFR": "ovale", "nameEN": "ovate", "defFR": "en forme d'oeuf", "url": "" }
  }
}"##;

pub fn flora_dataset() -> Dataset {
    codec::decode_str(FLORA_DOCUMENT).expect("fixture document decodes")
}
