//! XML rendering of the vet list for `/vets` with `Accept: application/xml`.
//!
//! Each vet becomes a `<vetList>` element inside `<vets>`, with one
//! `<specialties>` element per specialty.

use super::views::escape;
use crate::model::Vets;

fn element(out: &mut String, name: &str, value: &str) {
    out.push_str(&format!("<{name}>{}</{name}>", escape(value)));
}

pub fn vets_to_xml(vets: &Vets) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?><vets>");
    for vet in &vets.vet_list {
        out.push_str("<vetList>");
        if let Some(id) = vet.id {
            element(&mut out, "id", &id.to_string());
        }
        element(&mut out, "firstName", &vet.first_name);
        element(&mut out, "lastName", &vet.last_name);
        for specialty in vet.specialties() {
            out.push_str("<specialties>");
            if let Some(id) = specialty.id {
                element(&mut out, "id", &id.to_string());
            }
            element(&mut out, "name", &specialty.name);
            element(&mut out, "new", &specialty.is_new().to_string());
            out.push_str("</specialties>");
        }
        element(&mut out, "nrOfSpecialties", &vet.nr_of_specialties().to_string());
        element(&mut out, "new", &vet.is_new().to_string());
        out.push_str("</vetList>");
    }
    out.push_str("</vets>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Specialty, Vet};

    #[test]
    fn test_vets_xml_shape() {
        let mut leary = Vet::new(2, "Helen", "Leary");
        leary.add_specialty(Specialty::new(1, "radiology"));
        let carter = Vet::new(1, "James", "Carter");
        let xml = vets_to_xml(&Vets::new(vec![carter, leary]));

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains(
            "<vetList><id>1</id><firstName>James</firstName><lastName>Carter</lastName>\
             <nrOfSpecialties>0</nrOfSpecialties><new>false</new></vetList>"
        ));
        assert!(xml.contains("<specialties><id>1</id><name>radiology</name><new>false</new></specialties>"));
        assert!(xml.ends_with("</vets>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let xml = vets_to_xml(&Vets::new(vec![Vet::new(9, "A&B", "<C>")]));
        assert!(xml.contains("<firstName>A&amp;B</firstName>"));
        assert!(xml.contains("<lastName>&lt;C&gt;</lastName>"));
    }
}
