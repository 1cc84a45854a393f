//! GraphQL documents sent to the Admin API.

pub(super) const UPSERT: &str = r"
mutation MetaobjectUpsert($handle: MetaobjectHandleInput!, $metaobject: MetaobjectUpsertInput!) {
  metaobjectUpsert(handle: $handle, metaobject: $metaobject) {
    metaobject { id handle }
    userErrors { field message code }
  }
}
";

pub(super) const DELETE: &str = r"
mutation MetaobjectDelete($id: ID!) {
  metaobjectDelete(id: $id) {
    deletedId
    userErrors { field message code }
  }
}
";

pub(super) const QUERY_ALL: &str = r"
query Metaobjects($type: String!, $first: Int!, $after: String, $references: Int!) {
  metaobjects(type: $type, first: $first, after: $after) {
    nodes {
      id
      handle
      fields {
        key
        value
        reference { ...MediaUrl }
        references(first: $references) { nodes { ...MediaUrl } }
      }
    }
    pageInfo { hasNextPage endCursor }
  }
}

fragment MediaUrl on MetafieldReference {
  ... on MediaImage { id image { url } }
  ... on Video { id sources { url } }
  ... on GenericFile { id url }
}
";

pub(super) const RESOLVE: &str = r"
query ResolveMedia($ids: [ID!]!) {
  nodes(ids: $ids) {
    ... on MediaImage { id image { url } }
    ... on Video { id sources { url } }
    ... on GenericFile { id url }
  }
}
";
